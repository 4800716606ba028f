#![no_main]
use libfuzzer_sys::fuzz_target;
use revscope::{AntiDebugDetector, BinaryImage, ObfuscationAnalyzer, PackerDetector, PatternMatcher};

fuzz_target!(|data: &[u8]| {
    let image = BinaryImage::from_bytes(data.to_vec());
    let matcher = PatternMatcher::new();

    let metrics = ObfuscationAnalyzer::default().analyze(&image);
    assert!((0.0..=8.0).contains(&metrics.entropy));

    let _ = AntiDebugDetector::new().detect(&image, &matcher);
    let _ = PackerDetector::new().detect_packer(data, &matcher);
    for offsets in matcher.find_all_patterns(data).values() {
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }
});
