use crate::dates::{ASCENDING_SENTINEL_YEAR, DESCENDING_SENTINEL_YEAR};
use crate::request::SortMode;
use crate::stage::{DerivedField, PipelineStage, SortField, SortKey};

/// Sort-key `$addFields` plus the `$sort` for a mode.
///
/// Relevance emits nothing: the search stage already yields score order.
/// Every other mode ends on `_id` so pages never overlap or skip records.
pub fn build_sort_stages(mode: SortMode) -> Vec<PipelineStage> {
    let (derived, primary) = match mode {
        SortMode::Relevance => return Vec::new(),
        SortMode::Date => (
            DerivedField::SortDate { sentinel_year: DESCENDING_SENTINEL_YEAR },
            SortKey::descending(SortField::SortDate),
        ),
        SortMode::DateAsc => (
            DerivedField::SortDate { sentinel_year: ASCENDING_SENTINEL_YEAR },
            SortKey::ascending(SortField::SortDate),
        ),
        SortMode::Title => (DerivedField::NormalizedTitle, SortKey::ascending(SortField::NormalizedTitle)),
        SortMode::TitleDesc => (DerivedField::NormalizedTitle, SortKey::descending(SortField::NormalizedTitle)),
    };
    vec![
        PipelineStage::AddFields(derived),
        PipelineStage::Sort(vec![primary, SortKey::ascending(SortField::Id)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Direction;

    #[test]
    fn relevance_keeps_store_order() {
        assert!(build_sort_stages(SortMode::Relevance).is_empty());
    }

    #[test]
    fn date_sorts_use_opposite_sentinels() {
        let newest = build_sort_stages(SortMode::Date);
        assert_eq!(newest[0], PipelineStage::AddFields(DerivedField::SortDate { sentinel_year: 1111 }));
        let oldest = build_sort_stages(SortMode::DateAsc);
        assert_eq!(oldest[0], PipelineStage::AddFields(DerivedField::SortDate { sentinel_year: 9999 }));
    }

    #[test]
    fn every_ordered_mode_breaks_ties_by_id() {
        for mode in [SortMode::Date, SortMode::DateAsc, SortMode::Title, SortMode::TitleDesc] {
            match build_sort_stages(mode).last() {
                Some(PipelineStage::Sort(keys)) => {
                    assert_eq!(keys.last(), Some(&SortKey::ascending(SortField::Id)), "{mode:?}");
                }
                other => panic!("{mode:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn title_desc_reverses_only_the_title() {
        match &build_sort_stages(SortMode::TitleDesc)[1] {
            PipelineStage::Sort(keys) => {
                assert_eq!(keys[0].field, SortField::NormalizedTitle);
                assert_eq!(keys[0].direction, Direction::Descending);
                assert_eq!(keys[1].direction, Direction::Ascending);
            }
            other => panic!("{other:?}"),
        }
    }
}
