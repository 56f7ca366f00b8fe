use chrono::NaiveDate;
use uuid::Uuid;

use super::latest::{Latest, Ticket};
use super::payload::build_submission_payload;
use super::sequence::WaypointSequence;

use crate::{
    entities::{
        Coordinates, Directions, EditMode, Place, PlaceSuggestion, RouteCandidate, RouteDraft,
        RouteWindow, SubmissionPayload, TripAttributes, Waypoint,
    },
    error::{
        invalid_candidate_error, invalid_coordinates_error, missing_place_error,
        route_not_calculated_error, stale_route_error, submission_in_progress_error, Error,
    },
};

pub const LOOKUP_MIN_CHARS: usize = 2;

pub type LookupTicket = Ticket<String>;
pub type DirectionsTicket = Ticket<Vec<Coordinates>>;

/// State of one create, update or clone dialog.
#[derive(Clone, Debug)]
pub struct RouteEditor {
    mode: EditMode,
    origin: Option<Place>,
    destination: Option<Place>,
    attributes: TripAttributes,
    sequence: WaypointSequence,
    lookup: Latest<String>,
    suggestions: Vec<PlaceSuggestion>,
    directions: Latest<Vec<Coordinates>>,
    candidates: Directions,
    candidates_key: Option<Vec<Coordinates>>,
    selected: usize,
    notice: Option<Error>,
    submitting: bool,
}

impl RouteEditor {
    pub fn new(mode: EditMode, draft: RouteDraft, max_waypoints: usize) -> Self {
        let mut waypoints = draft.waypoints;

        // a clone is a new route, its stops get identities of their own
        if let EditMode::Clone { source_route_id: _ } = mode {
            for waypoint in waypoints.iter_mut() {
                waypoint.id = Uuid::new_v4();
            }
        }

        Self {
            mode,
            origin: draft.origin,
            destination: draft.destination,
            attributes: draft.attributes,
            sequence: WaypointSequence::with_waypoints(draft.window, waypoints)
                .max_waypoints(max_waypoints),
            lookup: Latest::new(),
            suggestions: vec![],
            directions: Latest::new(),
            candidates: vec![],
            candidates_key: None,
            selected: 0,
            notice: None,
            submitting: false,
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn sequence(&self) -> &WaypointSequence {
        &self.sequence
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.sequence.waypoints()
    }

    pub fn suggestions(&self) -> &[PlaceSuggestion] {
        &self.suggestions
    }

    pub fn candidates(&self) -> &[RouteCandidate] {
        &self.candidates
    }

    pub fn selected_candidate(&self) -> Option<&RouteCandidate> {
        self.candidates.get(self.selected)
    }

    pub fn notice(&self) -> Option<&Error> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Error> {
        self.notice.take()
    }

    pub fn draft(&self) -> RouteDraft {
        RouteDraft {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            window: *self.sequence.window(),
            attributes: self.attributes,
            waypoints: self.sequence.waypoints().to_vec(),
        }
    }

    pub fn set_origin(&mut self, place: Place) -> Result<(), Error> {
        if !place.coordinates.is_valid() {
            return Err(invalid_coordinates_error("origin"));
        }

        self.origin = Some(place);
        Ok(())
    }

    pub fn set_destination(&mut self, place: Place) -> Result<(), Error> {
        if !place.coordinates.is_valid() {
            return Err(invalid_coordinates_error("destination"));
        }

        self.destination = Some(place);
        Ok(())
    }

    pub fn set_attributes(&mut self, attributes: TripAttributes) {
        self.attributes = attributes;
    }

    pub fn change_window(&mut self, window: RouteWindow) -> usize {
        self.sequence.recompute_after_route_change(window)
    }

    pub fn add_waypoint(
        &mut self,
        place: Place,
        scheduled_arrival: NaiveDate,
    ) -> Result<&[Waypoint], Error> {
        self.sequence.add_waypoint(place, scheduled_arrival)
    }

    pub fn add_pending_waypoint(
        &mut self,
        name: String,
        scheduled_arrival: NaiveDate,
    ) -> Result<&[Waypoint], Error> {
        self.sequence.add_pending_waypoint(name, scheduled_arrival)
    }

    pub fn resolve_waypoint(&mut self, id: Uuid, place: Place) -> Result<&[Waypoint], Error> {
        self.sequence.resolve_waypoint(id, place)
    }

    pub fn remove_waypoint(&mut self, id: Uuid) -> &[Waypoint] {
        self.sequence.remove_waypoint(id)
    }

    pub fn update_waypoint_date(&mut self, id: Uuid, new_date: NaiveDate) -> Result<(), Error> {
        self.sequence.update_waypoint_date(id, new_date)
    }

    // place lookup

    /// Starts a lookup for `query`. Queries too short to search clear the
    /// suggestions and supersede whatever is still in flight.
    pub fn begin_lookup(&mut self, query: &str) -> Option<LookupTicket> {
        let query = query.trim();

        if query.chars().count() < LOOKUP_MIN_CHARS {
            self.lookup.invalidate();
            self.suggestions.clear();
            return None;
        }

        Some(self.lookup.issue(query.to_string()))
    }

    pub fn is_lookup_current(&self, ticket: &LookupTicket) -> bool {
        self.lookup.is_current(ticket)
    }

    /// Applies a lookup response unless a newer query was issued since. Returns
    /// whether the response was applied.
    pub fn apply_lookup(
        &mut self,
        ticket: &LookupTicket,
        result: Result<Vec<PlaceSuggestion>, Error>,
    ) -> bool {
        if !self.lookup.is_current(ticket) {
            tracing::debug!("discarding suggestions for superseded query {:?}", ticket.key);
            return false;
        }

        match result {
            Ok(suggestions) => self.suggestions = suggestions,
            Err(err) => {
                tracing::warn!("place lookup for {:?} failed: {}", ticket.key, err);
                self.suggestions.clear();
                self.notice = Some(err);
            }
        }

        true
    }

    // directions

    /// Origin, stops and destination in travel order, once all of them are resolved
    /// to usable coordinates.
    pub fn coordinate_set(&self) -> Option<Vec<Coordinates>> {
        let mut coordinates = Vec::with_capacity(self.sequence.len() + 2);

        coordinates.push(self.origin.as_ref()?.coordinates);
        for waypoint in self.sequence.waypoints() {
            coordinates.push(waypoint.coordinates?);
        }
        coordinates.push(self.destination.as_ref()?.coordinates);

        if !coordinates.iter().all(Coordinates::is_valid) {
            return None;
        }

        Some(coordinates)
    }

    pub fn begin_directions(&mut self) -> Option<DirectionsTicket> {
        let coordinates = self.coordinate_set()?;
        Some(self.directions.issue(coordinates))
    }

    pub fn is_directions_current(&self, ticket: &DirectionsTicket) -> bool {
        self.directions.is_current(ticket)
            && self.coordinate_set().as_ref() == Some(&ticket.key)
    }

    /// Applies directions unless a newer request was issued or the stops changed
    /// since. The first alternative is selected. Returns whether it was applied.
    pub fn apply_directions(
        &mut self,
        ticket: &DirectionsTicket,
        result: Result<Directions, Error>,
    ) -> bool {
        if !self.is_directions_current(ticket) {
            tracing::debug!("discarding directions for a superseded set of stops");
            return false;
        }

        match result {
            Ok(candidates) => {
                self.candidates = candidates;
                self.candidates_key = Some(ticket.key.clone());
                self.selected = 0;
            }
            Err(err) => {
                tracing::warn!("directions request failed: {}", err);
                self.notice = Some(err);
            }
        }

        true
    }

    pub fn select_candidate(&mut self, index: usize) -> Result<&RouteCandidate, Error> {
        let candidate = self
            .candidates
            .get(index)
            .ok_or_else(|| invalid_candidate_error(index))?;

        self.selected = index;

        Ok(candidate)
    }

    // submission

    pub fn validate_for_submission(&self) -> Result<(), Error> {
        let ends = [("origin", &self.origin), ("destination", &self.destination)];

        for (field, place) in ends {
            match place {
                None => return Err(missing_place_error(field)),
                Some(place) if !place.coordinates.is_valid() => {
                    return Err(invalid_coordinates_error(field))
                }
                Some(_) => (),
            }
        }

        self.sequence.window().validate()?;
        self.sequence.validate()?;
        self.attributes.validate()?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(mode = %self.mode.name()))]
    pub fn submission_payload(&self) -> Result<SubmissionPayload, Error> {
        self.validate_for_submission()?;

        let candidate = self
            .selected_candidate()
            .ok_or_else(|| route_not_calculated_error())?;

        if self.candidates_key != self.coordinate_set() {
            return Err(stale_route_error());
        }

        let mut payload = build_submission_payload(&self.draft(), candidate)?;

        if let EditMode::Update { route_id } = &self.mode {
            payload.route_id = Some(route_id.clone());
        }

        Ok(payload)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Builds the payload and marks the route as in flight. Fails while an earlier
    /// submission of the same route has not finished.
    pub fn begin_submission(&mut self) -> Result<SubmissionPayload, Error> {
        if self.submitting {
            return Err(submission_in_progress_error());
        }

        let payload = self.submission_payload()?;
        self.submitting = true;

        Ok(payload)
    }

    pub fn end_submission(&mut self) {
        self.submitting = false;
    }
}

#[cfg(test)]
fn lyon() -> Place {
    Place::new("Lyon", Coordinates::new(4.8357, 45.764))
}

#[cfg(test)]
fn dijon() -> Place {
    Place::new("Dijon", Coordinates::new(5.0415, 47.322))
}

#[cfg(test)]
fn beaune() -> Place {
    Place::new("Beaune", Coordinates::new(4.8400, 47.0260))
}

#[cfg(test)]
pub(crate) fn ready_editor(mode: EditMode) -> RouteEditor {
    use super::sequence::MAX_WAYPOINTS;
    use crate::entities::june_window;

    let mut draft = RouteDraft::new(june_window());
    draft.origin = Some(lyon());
    draft.destination = Some(dijon());

    RouteEditor::new(mode, draft, MAX_WAYPOINTS)
}

#[cfg(test)]
fn suggestion(label: &str) -> PlaceSuggestion {
    PlaceSuggestion {
        label: label.into(),
        coordinates: Coordinates::new(4.8, 45.7),
    }
}

#[test]
fn second_stop_scheduled_before_the_first_fails_submission() {
    use crate::entities::date;
    use crate::error::out_of_order_error;

    let mut editor = ready_editor(EditMode::Create);

    assert!(editor.add_waypoint(beaune(), date(2024, 6, 2)).is_ok());
    let second = Place::new("Chalon", Coordinates::new(4.85, 46.78));
    assert!(editor.add_waypoint(second, date(2024, 6, 1)).is_ok());

    assert_eq!(
        editor.validate_for_submission(),
        Err(out_of_order_error("Chalon"))
    );
    assert_eq!(
        editor.submission_payload().unwrap_err(),
        out_of_order_error("Chalon")
    );
}

#[test]
fn stale_lookup_response_is_discarded() {
    let mut editor = ready_editor(EditMode::Create);

    let a = editor.begin_lookup("Be").unwrap();
    let b = editor.begin_lookup("Beaune").unwrap();

    assert!(editor.apply_lookup(&b, Ok(vec![suggestion("Beaune, France")])));
    assert!(!editor.apply_lookup(&a, Ok(vec![suggestion("Berlin, Germany")])));

    let labels: Vec<&str> = editor
        .suggestions()
        .iter()
        .map(|s| s.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Beaune, France"]);
}

#[test]
fn short_queries_clear_suggestions_and_supersede() {
    let mut editor = ready_editor(EditMode::Create);

    let ticket = editor.begin_lookup("Lyon").unwrap();
    assert!(editor.begin_lookup("L").is_none());
    assert!(editor.begin_lookup("  L ").is_none());

    assert!(!editor.apply_lookup(&ticket, Ok(vec![suggestion("Lyon, France")])));
    assert!(editor.suggestions().is_empty());
}

#[test]
fn failed_lookup_yields_no_suggestions_and_a_notice() {
    use crate::error::upstream_error;

    let mut editor = ready_editor(EditMode::Create);

    let first = editor.begin_lookup("Lyon").unwrap();
    editor.apply_lookup(&first, Ok(vec![suggestion("Lyon, France")]));

    let second = editor.begin_lookup("Lyons").unwrap();
    assert!(editor.apply_lookup(&second, Err(upstream_error())));

    assert!(editor.suggestions().is_empty());
    assert_eq!(editor.take_notice(), Some(upstream_error()));
    assert_eq!(editor.notice(), None);
}

#[test]
fn directions_for_changed_stops_are_discarded() {
    use crate::engine::payload::candidate;
    use crate::entities::date;

    let mut editor = ready_editor(EditMode::Create);

    let ticket = editor.begin_directions().unwrap();
    editor.add_waypoint(beaune(), date(2024, 6, 2)).unwrap();

    assert!(!editor.apply_directions(&ticket, Ok(vec![candidate(&[12000.0])])));
    assert!(editor.candidates().is_empty());

    let ticket = editor.begin_directions().unwrap();
    assert_eq!(ticket.key.len(), 3);
    assert!(editor.apply_directions(&ticket, Ok(vec![candidate(&[5000.0, 7000.0])])));
    assert_eq!(editor.candidates().len(), 1);
}

#[test]
fn directions_wait_for_every_stop_to_resolve() {
    use crate::entities::date;

    let mut editor = ready_editor(EditMode::Create);
    editor
        .add_pending_waypoint("near Beaune".into(), date(2024, 6, 2))
        .unwrap();

    assert!(editor.begin_directions().is_none());

    let id = editor.waypoints()[0].id;
    editor.resolve_waypoint(id, beaune()).unwrap();

    assert!(editor.begin_directions().is_some());
}

#[test]
fn payload_uses_the_selected_alternative() {
    use crate::engine::payload::candidate;
    use crate::entities::date;

    let mut editor = ready_editor(EditMode::Create);
    editor.add_waypoint(beaune(), date(2024, 6, 2)).unwrap();

    let ticket = editor.begin_directions().unwrap();
    editor.apply_directions(
        &ticket,
        Ok(vec![
            candidate(&[5000.0, 7000.0]),
            candidate(&[6000.0, 9000.0]),
        ]),
    );

    let payload = editor.submission_payload().unwrap();
    assert_eq!(payload.cumulative_distances(), vec![0.0, 5000.0, 12000.0]);

    editor.select_candidate(1).unwrap();
    let payload = editor.submission_payload().unwrap();
    assert_eq!(payload.cumulative_distances(), vec![0.0, 6000.0, 15000.0]);

    assert_eq!(
        editor.select_candidate(2).unwrap_err(),
        invalid_candidate_error(2)
    );
}

#[test]
fn payload_requires_fresh_directions() {
    use crate::engine::payload::candidate;
    use crate::entities::date;

    let mut editor = ready_editor(EditMode::Create);
    assert_eq!(
        editor.submission_payload().unwrap_err(),
        route_not_calculated_error()
    );

    let ticket = editor.begin_directions().unwrap();
    editor.apply_directions(&ticket, Ok(vec![candidate(&[12000.0])]));
    assert!(editor.submission_payload().is_ok());

    editor.add_waypoint(beaune(), date(2024, 6, 2)).unwrap();
    assert_eq!(
        editor.submission_payload().unwrap_err(),
        stale_route_error()
    );
}

#[test]
fn update_mode_carries_the_route_id() {
    use crate::engine::payload::candidate;

    let mut editor = ready_editor(EditMode::Update {
        route_id: "r-42".into(),
    });

    let ticket = editor.begin_directions().unwrap();
    editor.apply_directions(&ticket, Ok(vec![candidate(&[12000.0])]));

    let payload = editor.submission_payload().unwrap();
    assert_eq!(payload.route_id.as_deref(), Some("r-42"));
}

#[test]
fn clone_mode_gives_stops_new_ids() {
    use super::sequence::MAX_WAYPOINTS;
    use crate::entities::date;

    let mut original = ready_editor(EditMode::Create);
    original.add_waypoint(beaune(), date(2024, 6, 2)).unwrap();
    let draft = original.draft();

    let update = RouteEditor::new(
        EditMode::Update {
            route_id: "r-42".into(),
        },
        draft.clone(),
        MAX_WAYPOINTS,
    );
    let clone = RouteEditor::new(
        EditMode::Clone {
            source_route_id: "r-42".into(),
        },
        draft.clone(),
        MAX_WAYPOINTS,
    );

    assert_eq!(update.waypoints()[0].id, draft.waypoints[0].id);
    assert_ne!(clone.waypoints()[0].id, draft.waypoints[0].id);
    assert_eq!(clone.waypoints()[0].name, "Beaune");
}

#[test]
fn missing_places_and_bad_windows_block_submission() {
    use crate::entities::june_window;
    use crate::error::arrival_before_departure_error;

    let editor = RouteEditor::new(EditMode::Create, RouteDraft::new(june_window()), 23);
    assert_eq!(
        editor.validate_for_submission(),
        Err(missing_place_error("origin"))
    );

    let mut editor = ready_editor(EditMode::Create);
    let mut window = june_window();
    window.end_date = window.departure_date;
    window.end_time = window.departure_time;
    editor.change_window(window);

    assert_eq!(
        editor.validate_for_submission(),
        Err(arrival_before_departure_error())
    );
}

#[test]
fn a_route_is_submitted_once_at_a_time() {
    use crate::engine::payload::candidate;

    let mut editor = ready_editor(EditMode::Create);
    let ticket = editor.begin_directions().unwrap();
    editor.apply_directions(&ticket, Ok(vec![candidate(&[12000.0])]));

    assert!(editor.begin_submission().is_ok());
    assert!(editor.is_submitting());
    assert_eq!(
        editor.begin_submission().unwrap_err(),
        submission_in_progress_error()
    );

    editor.end_submission();
    assert!(!editor.is_submitting());
    assert!(editor.begin_submission().is_ok());
}

#[test]
fn invalid_submissions_do_not_mark_the_route_in_flight() {
    let mut editor = ready_editor(EditMode::Create);

    assert_eq!(
        editor.begin_submission().unwrap_err(),
        route_not_calculated_error()
    );
    assert!(!editor.is_submitting());
}

#[test]
fn ends_without_usable_coordinates_are_rejected() {
    use crate::entities::june_window;

    let mut editor = ready_editor(EditMode::Create);

    let nowhere = Place::new("Nowhere", Coordinates::new(f64::NAN, 45.0));
    assert_eq!(
        editor.set_origin(nowhere),
        Err(invalid_coordinates_error("origin"))
    );
    let off_the_map = Place::new("Off the map", Coordinates::new(200.0, 45.0));
    assert_eq!(
        editor.set_destination(off_the_map),
        Err(invalid_coordinates_error("destination"))
    );
    assert_eq!(editor.draft().origin, Some(lyon()));
    assert_eq!(editor.draft().destination, Some(dijon()));

    let mut draft = RouteDraft::new(june_window());
    draft.origin = Some(lyon());
    draft.destination = Some(Place::new("Corrupt", Coordinates::new(5.0, f64::NAN)));
    let editor = RouteEditor::new(EditMode::Create, draft, 23);

    assert!(editor.coordinate_set().is_none());
    assert_eq!(
        editor.validate_for_submission(),
        Err(invalid_coordinates_error("destination"))
    );
}
