use firstlight::{Director, Narrative, Schedule};

fn mix64(mut z: u64) -> u64 {
    // SplitMix64 mixing function.
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn sweep_digest(narrative: Narrative) -> u64 {
    let mut director = Director::new(narrative).unwrap();
    let mut digest = 0u64;
    for i in 0..=40u32 {
        let progress = f64::from(i) / 40.0;
        let frame = director.evaluate(progress).unwrap();
        let bytes = serde_json::to_vec(&frame).unwrap();
        digest ^= digest_u64(&bytes);
    }
    digest
}

#[test]
fn fixture_matches_the_builtin_narrative() {
    let s = include_str!("data/night_to_dawn.json");
    let from_json: Narrative = serde_json::from_str(s).unwrap();
    from_json.validate().unwrap();

    assert_eq!(sweep_digest(from_json), sweep_digest(Narrative::night_to_dawn()));
}

#[test]
fn json_roundtrip_preserves_evaluation() {
    let narrative = Narrative::night_to_dawn();
    let s = serde_json::to_string_pretty(&narrative).unwrap();
    let de: Narrative = serde_json::from_str(&s).unwrap();

    assert_eq!(sweep_digest(de), sweep_digest(narrative));
}

#[test]
fn evaluation_sweep_is_deterministic() {
    assert_eq!(
        sweep_digest(Narrative::night_to_dawn()),
        sweep_digest(Narrative::night_to_dawn())
    );
}

#[test]
fn validate_rejects_unsorted_stops() {
    let s = include_str!("data/night_to_dawn.json");
    let mut narrative: Narrative = serde_json::from_str(s).unwrap();

    let skyline = narrative.opacities.get_mut("skyline").unwrap();
    skyline.stops.reverse();
    assert!(narrative.validate().is_err());
}

#[test]
fn validate_rejects_empty_schedules_and_bad_triggers() {
    let mut narrative = Narrative::night_to_dawn();
    narrative
        .offsets
        .insert("empty".to_owned(), Schedule { stops: vec![] });
    assert!(narrative.validate().is_err());

    let mut narrative = Narrative::night_to_dawn();
    narrative.triggers.insert("late".to_owned(), 2.0);
    assert!(narrative.validate().is_err());
}

#[test]
fn background_endpoints_match_the_authored_hex() {
    let s = include_str!("data/night_to_dawn.json");
    let narrative: Narrative = serde_json::from_str(s).unwrap();
    let mut director = Director::new(narrative).unwrap();

    assert_eq!(director.evaluate(0.0).unwrap().background.to_hex(), "#020617");
    assert_eq!(director.evaluate(1.0).unwrap().background.to_hex(), "#fff8e1");
}
