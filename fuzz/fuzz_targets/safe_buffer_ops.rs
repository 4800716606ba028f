#![no_main]
use libfuzzer_sys::fuzz_target;
use revscope::SafeBuffer;

// first byte: buffer size; then (offset, length) pairs
fuzz_target!(|data: &[u8]| {
    let Some((&size, ops)) = data.split_first() else {
        return;
    };
    let mut buf = SafeBuffer::new(size as usize);
    for pair in ops.chunks_exact(2) {
        let (offset, length) = (pair[0] as usize, pair[1] as usize);
        let payload = vec![0xA5; length];
        let in_bounds = offset + length <= buf.len();
        assert_eq!(buf.write(offset, &payload).is_ok(), in_bounds);
        if in_bounds {
            assert_eq!(buf.read(offset, length).unwrap(), payload);
        }
    }
    buf.clear();
    assert!(buf.to_bytes().iter().all(|&b| b == 0));
});
