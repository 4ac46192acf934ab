//! Retrieval grouping
//!
//! Produces two independent partitions of a user's records:
//! - Emotion: each record goes to exactly one of surprise, sorrow, joy, neutral
//! - Thematic: each record goes to the bucket named by its stored category

use moodlens_common::PhotoRecord;

use crate::models::{EmotionGroupKey, EmotionGroups, GroupedPhotos, ThematicGroups};

/// Dominant emotion of a record
///
/// Faces are scanned in stored order. The first face showing surprise, sorrow or joy
/// (checked in that priority) decides; a record with no such face is neutral.
pub fn emotion_group_for(record: &PhotoRecord) -> EmotionGroupKey {
    for face in &record.emotions {
        if face.surprise.is_present() {
            return EmotionGroupKey::Surprise;
        }
        if face.sorrow.is_present() {
            return EmotionGroupKey::Sorrow;
        }
        if face.joy.is_present() {
            return EmotionGroupKey::Joy;
        }
    }
    EmotionGroupKey::Neutral
}

/// Partition records by dominant emotion
pub fn group_by_emotion(records: &[PhotoRecord]) -> EmotionGroups {
    let mut groups = EmotionGroups::default();
    for record in records {
        groups.push(emotion_group_for(record), record.clone());
    }
    groups
}

/// Partition records by stored category
pub fn group_by_theme(records: &[PhotoRecord]) -> ThematicGroups {
    let mut groups = ThematicGroups::new();
    for record in records {
        groups
            .entry(record.category.clone())
            .or_default()
            .push(record.clone());
    }
    groups
}

/// Both partitions over the same record set
pub fn group_photos(records: &[PhotoRecord]) -> GroupedPhotos {
    GroupedPhotos {
        photos: group_by_emotion(records),
        thematic_groups: group_by_theme(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodlens_common::{FaceEmotions, Likelihood, UNCATEGORIZED};

    fn record(url: &str, category: &str, emotions: Vec<FaceEmotions>) -> PhotoRecord {
        PhotoRecord {
            user_id: "u1".to_string(),
            url: url.to_string(),
            labels: vec![],
            landmarks: vec![],
            emotions,
            category: category.to_string(),
            date: None,
        }
    }

    fn face(joy: Likelihood, sorrow: Likelihood, surprise: Likelihood) -> FaceEmotions {
        FaceEmotions {
            joy,
            sorrow,
            anger: Likelihood::VeryUnlikely,
            surprise,
        }
    }

    use Likelihood::{Likely, Possible, VeryLikely, VeryUnlikely};

    #[test]
    fn test_sorrow_beats_joy_within_one_face() {
        let r = record("a", UNCATEGORIZED, vec![face(VeryLikely, Likely, VeryUnlikely)]);
        assert_eq!(emotion_group_for(&r), EmotionGroupKey::Sorrow);
    }

    #[test]
    fn test_surprise_beats_everything_within_one_face() {
        let r = record("a", UNCATEGORIZED, vec![face(VeryLikely, VeryLikely, Likely)]);
        assert_eq!(emotion_group_for(&r), EmotionGroupKey::Surprise);
    }

    #[test]
    fn test_first_qualifying_face_decides() {
        // Face 1 is joyful, face 2 surprised: the earlier face wins
        let r = record(
            "a",
            UNCATEGORIZED,
            vec![
                face(Likely, VeryUnlikely, VeryUnlikely),
                face(VeryUnlikely, VeryUnlikely, VeryLikely),
            ],
        );
        assert_eq!(emotion_group_for(&r), EmotionGroupKey::Joy);
    }

    #[test]
    fn test_non_qualifying_faces_are_skipped() {
        let r = record(
            "a",
            UNCATEGORIZED,
            vec![
                face(Possible, Possible, Possible),
                face(VeryUnlikely, Likely, VeryUnlikely),
            ],
        );
        assert_eq!(emotion_group_for(&r), EmotionGroupKey::Sorrow);
    }

    #[test]
    fn test_no_faces_is_neutral() {
        let r = record("a", UNCATEGORIZED, vec![]);
        assert_eq!(emotion_group_for(&r), EmotionGroupKey::Neutral);
    }

    #[test]
    fn test_anger_alone_is_neutral() {
        let r = record(
            "a",
            UNCATEGORIZED,
            vec![FaceEmotions {
                anger: VeryLikely,
                ..Default::default()
            }],
        );
        assert_eq!(emotion_group_for(&r), EmotionGroupKey::Neutral);
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_emotion_group() {
        let records = vec![
            record("1", "Adventures", vec![face(Likely, VeryUnlikely, VeryUnlikely)]),
            record("2", "Adventures", vec![face(VeryUnlikely, VeryLikely, VeryUnlikely)]),
            record("3", UNCATEGORIZED, vec![face(VeryUnlikely, VeryUnlikely, Likely)]),
            record("4", "Celebrations", vec![]),
            record("5", UNCATEGORIZED, vec![face(Possible, Possible, Possible)]),
        ];

        let groups = group_by_emotion(&records);

        assert_eq!(groups.total(), records.len());
        for r in &records {
            let hits = [
                EmotionGroupKey::Surprise,
                EmotionGroupKey::Sorrow,
                EmotionGroupKey::Joy,
                EmotionGroupKey::Neutral,
            ]
            .iter()
            .filter(|key| groups.group(**key).contains(r))
            .count();
            assert_eq!(hits, 1, "record {} should be in exactly one group", r.url);
        }
        assert_eq!(groups.joy.len(), 1);
        assert_eq!(groups.sorrow.len(), 1);
        assert_eq!(groups.surprise.len(), 1);
        assert_eq!(groups.neutral.len(), 2);
    }

    #[test]
    fn test_thematic_groups_use_stored_category_verbatim() {
        let records = vec![
            record("1", "Adventures", vec![]),
            record("2", UNCATEGORIZED, vec![]),
            record("3", "Adventures", vec![]),
            record("4", "Retired Category", vec![]),
        ];

        let groups = group_by_theme(&records);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups["Adventures"].len(), 2);
        assert_eq!(groups[UNCATEGORIZED].len(), 1);
        assert_eq!(groups["Retired Category"].len(), 1);
        assert_eq!(groups.values().map(Vec::len).sum::<usize>(), records.len());
    }

    #[test]
    fn test_group_photos_builds_both_partitions() {
        let records = vec![
            record("1", "Adventures", vec![face(Likely, VeryUnlikely, VeryUnlikely)]),
            record("2", UNCATEGORIZED, vec![]),
        ];

        let grouped = group_photos(&records);

        assert_eq!(grouped.photos.total(), 2);
        assert_eq!(grouped.thematic_groups.values().map(Vec::len).sum::<usize>(), 2);

        let json = serde_json::to_value(&grouped).unwrap();
        assert!(json["photos"]["neutral"].is_array());
        assert!(json["thematicGroups"]["Adventures"].is_array());
    }

    #[test]
    fn test_empty_input_yields_empty_groups() {
        let grouped = group_photos(&[]);
        assert_eq!(grouped.photos.total(), 0);
        assert!(grouped.thematic_groups.is_empty());

        let json = serde_json::to_value(&grouped).unwrap();
        assert_eq!(json["photos"]["surprise"], serde_json::json!([]));
    }
}
