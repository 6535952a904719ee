//! Classification of reference hand poses

mod test_helpers;

use makaton_gesture::{
    classifier::{classify, GestureClassifier, GestureThresholds},
    gesture::{describe, Gesture},
    landmark::{index, HandLandmarkSet, Landmark},
};
use test_helpers::{goodbye_hand, hand, hello_hand, please_hand, thank_you_hand, unmatched_hand, yes_hand};

#[test]
fn test_reference_hands() {
    let thresholds = GestureThresholds::default();
    let cases = [
        ("hello", hello_hand(), Some(Gesture::Hello)),
        ("goodbye", goodbye_hand(), Some(Gesture::Goodbye)),
        ("please", please_hand(), Some(Gesture::Please)),
        ("thank you", thank_you_hand(), Some(Gesture::ThankYou)),
        ("yes", yes_hand(), Some(Gesture::Yes)),
        ("unmatched", unmatched_hand(), None),
    ];

    for (name, hand, expected) in cases {
        assert_eq!(classify(&hand, &thresholds), expected, "{name} hand");
    }
}

#[test]
fn test_hello_takes_priority_over_yes() {
    // Thumb is also left of the index tip, but the Hello rule comes first
    let h = hello_hand();
    assert!(h.thumb_tip().x < h.index_tip().x);
    assert_eq!(classify(&h, &GestureThresholds::default()), Some(Gesture::Hello));
}

#[test]
fn test_please_takes_priority_over_yes() {
    let h = hand(&[
        (index::WRIST, (0.5, 0.8)),
        (index::THUMB_TIP, (0.45, 0.7)),
        (index::INDEX_FINGER_TIP, (0.5, 0.3)),
        (index::MIDDLE_FINGER_TIP, (0.5, 0.65)),
        (index::RING_FINGER_TIP, (0.6, 0.35)),
        (index::PINKY_TIP, (0.65, 0.4)),
    ]);
    assert!(h.thumb_tip().x < h.index_tip().x);
    assert_eq!(classify(&h, &GestureThresholds::default()), Some(Gesture::Please));
}

#[test]
fn test_thumb_level_with_wrist_falls_through() {
    // Thumb close to the wrist but at the same height: neither Please nor Thank You
    let h = hand(&[
        (index::WRIST, (0.5, 0.5)),
        (index::THUMB_TIP, (0.6, 0.5)),
        (index::INDEX_FINGER_TIP, (0.5, 0.0)),
        (index::MIDDLE_FINGER_TIP, (0.62, 0.5)),
        (index::RING_FINGER_TIP, (0.6, 0.9)),
        (index::PINKY_TIP, (0.6, 0.1)),
    ]);
    assert_eq!(classify(&h, &GestureThresholds::default()), None);
}

#[test]
fn test_depth_does_not_change_the_label() {
    let flat = yes_hand();
    let deep: Vec<Landmark> = flat
        .iter()
        .enumerate()
        .map(|(i, p)| Landmark::with_depth(p.x, p.y, i as f32 * 0.1))
        .collect();
    let deep = HandLandmarkSet::try_from(deep).unwrap();
    assert_eq!(
        classify(&deep, &GestureThresholds::default()),
        classify(&flat, &GestureThresholds::default())
    );
}

#[test]
fn test_classifier_output_has_description() {
    let classifier = GestureClassifier::default();
    for h in [hello_hand(), goodbye_hand(), please_hand(), thank_you_hand(), yes_hand()] {
        let gesture = classifier.classify(&h);
        let (label, description) = describe(gesture);
        assert_ne!(label, "None");
        assert!(!description.is_empty());
    }
    assert_eq!(describe(classifier.classify(&unmatched_hand())), ("None", "None"));
}

#[test]
fn test_wrong_landmark_count_is_rejected() {
    let short = vec![Landmark::new(0.0, 0.0); 20];
    assert!(HandLandmarkSet::try_from(short).is_err());
}
