use keysync::analysis::{analyze_audio, analyze_signal, AnalysisConfig, AnalysisResult, Scale};
use keysync::wav::{encode, EncodeOptions};
use keysync::{AudioFormat, StratumBackend};

const SAMPLE_RATE: u32 = 44100;

/// 10 seconds of A#4 at half scale
fn tone() -> Vec<f32> {
    let frequency = 466.16f32;
    (0..SAMPLE_RATE as usize * 10)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

fn is_pitch_class(key: &str) -> bool {
    let mut chars = key.chars();
    let letter_ok = matches!(chars.next(), Some('A'..='G'));
    let rest: String = chars.collect();
    letter_ok && (rest.is_empty() || rest == "#" || rest == "b")
}

fn assert_complete(result: &AnalysisResult) {
    let bpm = result.bpm.expect("no tempo detected");
    assert!(bpm > 0.0, "bpm was {}", bpm);
    assert!(result.rounded_bpm.is_some());

    let key = result.key.as_deref().expect("no key detected");
    assert!(is_pitch_class(key), "unexpected key {:?}", key);
    assert!(matches!(result.scale, Some(Scale::Major) | Some(Scale::Minor)));

    let confidence = result.confidence.expect("no key confidence");
    assert!((0.0..=1.0).contains(&confidence));
}

#[test]
fn test_wav_tone_yields_tempo_key_and_scale() {
    let wav = encode(&[tone()], &EncodeOptions::new(SAMPLE_RATE)).unwrap();
    assert!(wav.starts_with(b"RIFF"));
    assert_eq!(&wav[8..12], b"WAVE");

    let result = analyze_audio(wav, AudioFormat::Wav, &AnalysisConfig::new(), &StratumBackend::new())
        .unwrap();
    assert_complete(&result);
}

#[test]
fn test_chunked_signal_yields_tempo_key_and_scale() {
    let config = AnalysisConfig::new().with_chunk_size(SAMPLE_RATE as usize * 5);
    let result = analyze_signal(&tone(), SAMPLE_RATE, &config, &StratumBackend::new()).unwrap();
    assert_complete(&result);
}

#[test]
fn test_pitch_class_check() {
    assert!(is_pitch_class("A#"));
    assert!(is_pitch_class("Eb"));
    assert!(is_pitch_class("C"));
    assert!(!is_pitch_class("H"));
    assert!(!is_pitch_class("C major"));
}
