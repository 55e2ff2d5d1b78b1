//! Progression assignment for extracted elements.

use std::ops::RangeInclusive;

use crate::content::ContentElement;

/// Set the progression of every element from its position in `elements`.
///
/// Element `i` of `n` gets a resource progression of `i / n`. When the
/// resource's span of the publication is known, the total progression is
/// interpolated into `total_range`; otherwise it is cleared. Segment
/// locators of text elements are updated too.
pub fn adjust_progressions(
    elements: &mut [ContentElement],
    total_range: Option<&RangeInclusive<f64>>,
) {
    let count = elements.len() as f64;
    if elements.is_empty() {
        return;
    }

    for (index, element) in elements.iter_mut().enumerate() {
        let progression = index as f64 / count;
        let total_progression =
            total_range.map(|range| range.start() + progression * (range.end() - range.start()));

        element.update_locators(|locator| {
            locator.locations.progression = Some(progression);
            locator.locations.total_progression = total_progression;
        });
    }
}
