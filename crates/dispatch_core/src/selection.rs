//! Two-click pickup/drop-off selection.
//!
//! The first selected intersection becomes the pickup, the second (if different)
//! the drop-off, at which point the completed pair is handed back and the machine
//! resets. Selecting the pickup again while waiting for a drop-off is ignored.

use crate::dispatch::RideRequest;
use crate::network::IntersectionId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassengerSelection {
    #[default]
    AwaitingSource,
    AwaitingDestination {
        source: IntersectionId,
    },
}

/// What a single selection did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStep {
    SourceChosen(IntersectionId),
    /// Both endpoints are known; the machine is back to awaiting a source.
    Complete {
        source: IntersectionId,
        destination: IntersectionId,
    },
    Ignored,
}

impl SelectionStep {
    /// Turn a completed selection into a request with the given share preference.
    pub fn into_request(self, share_ride: bool) -> Option<RideRequest> {
        match self {
            SelectionStep::Complete {
                source,
                destination,
            } => Some(RideRequest::new(source, destination, share_ride)),
            _ => None,
        }
    }
}

impl PassengerSelection {
    pub fn select(&mut self, node: IntersectionId) -> SelectionStep {
        match *self {
            PassengerSelection::AwaitingSource => {
                *self = PassengerSelection::AwaitingDestination { source: node };
                SelectionStep::SourceChosen(node)
            }
            PassengerSelection::AwaitingDestination { source } if source == node => {
                SelectionStep::Ignored
            }
            PassengerSelection::AwaitingDestination { source } => {
                *self = PassengerSelection::AwaitingSource;
                SelectionStep::Complete {
                    source,
                    destination: node,
                }
            }
        }
    }

    pub fn reset(&mut self) {
        *self = PassengerSelection::AwaitingSource;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_distinct_clicks_complete_a_request() {
        let mut selection = PassengerSelection::default();
        assert_eq!(selection.select(3), SelectionStep::SourceChosen(3));
        assert_eq!(
            selection,
            PassengerSelection::AwaitingDestination { source: 3 }
        );
        let step = selection.select(8);
        assert_eq!(
            step,
            SelectionStep::Complete {
                source: 3,
                destination: 8
            }
        );
        assert_eq!(selection, PassengerSelection::AwaitingSource);
        assert_eq!(step.into_request(true), Some(RideRequest::new(3, 8, true)));
    }

    #[test]
    fn reselecting_the_pickup_is_ignored() {
        let mut selection = PassengerSelection::default();
        selection.select(5);
        assert_eq!(selection.select(5), SelectionStep::Ignored);
        assert_eq!(
            selection,
            PassengerSelection::AwaitingDestination { source: 5 }
        );
        assert_eq!(SelectionStep::Ignored.into_request(false), None);
    }

    #[test]
    fn reset_discards_a_half_made_selection() {
        let mut selection = PassengerSelection::default();
        selection.select(1);
        selection.reset();
        assert_eq!(selection.select(2), SelectionStep::SourceChosen(2));
    }
}
