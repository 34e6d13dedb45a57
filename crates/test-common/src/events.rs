//! Event stream processing helpers for async service tests.

use deployclean::clean::{CleanEvent, CleanSummary, EventStream};

/// Collects all events from a stream for testing verification.
///
/// # Example
/// ```rust
/// let stream = service.clean(CleanTargets::All).await;
/// let events = collect_events(stream).await;
/// ```
pub async fn collect_events(mut stream: EventStream) -> Vec<CleanEvent> {
    let mut events = Vec::new();
    while let Some(event) = futures::StreamExt::next(&mut stream).await {
        events.push(event);
    }
    events
}

/// Extracts the run summary carried by the completed event.
#[must_use]
pub fn get_summary(events: &[CleanEvent]) -> Option<&CleanSummary> {
    events.iter().find_map(|event| match event {
        CleanEvent::Completed { summary, .. } => Some(summary),
        _ => None,
    })
}

/// Counts events of a specific type for verification.
///
/// # Example
/// ```rust
/// let progress_count = count_events_of_type(&events, |e| {
///     matches!(e, CleanEvent::Progress { .. })
/// });
/// ```
pub fn count_events_of_type<F>(events: &[CleanEvent], predicate: F) -> usize
where
    F: Fn(&CleanEvent) -> bool,
{
    events.iter().filter(|e| predicate(e)).count()
}

/// Checks for exactly one started and one completed event, the completed one last, and a
/// successful summary.
///
/// # Panics
/// Panics if the event sequence doesn't match a successful run.
pub fn assert_successful_run(events: &[CleanEvent]) {
    assert_eq!(
        count_events_of_type(events, |e| matches!(e, CleanEvent::Started { .. })),
        1,
        "Should have exactly one started event"
    );
    assert!(
        matches!(events.last(), Some(CleanEvent::Completed { .. })),
        "The completed event should come last"
    );
    assert_no_errors(events);

    let summary = get_summary(events).expect("Should have a summary");
    assert!(summary.is_success(), "Run should succeed, got: {summary:?}");
}

/// Checks for at least one error event and a failed summary.
///
/// # Panics
/// Panics if the event sequence doesn't match a failed run.
pub fn assert_failed_run(events: &[CleanEvent]) {
    assert!(
        count_events_of_type(events, |e| matches!(e, CleanEvent::Error { .. })) > 0,
        "Should have at least one error event for a failed run"
    );
    let summary = get_summary(events).expect("Should have a summary");
    assert!(!summary.is_success(), "Run should fail, got: {summary:?}");
}

/// All messages of error events.
#[must_use]
pub fn get_error_messages(events: &[CleanEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            CleanEvent::Error { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// All messages of warning events.
#[must_use]
pub fn get_warning_messages(events: &[CleanEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            CleanEvent::Warning { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// All messages of verbose events.
#[must_use]
pub fn get_verbose_messages(events: &[CleanEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            CleanEvent::Verbose { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// # Panics
/// Panics if any error event occurred.
pub fn assert_no_errors(events: &[CleanEvent]) {
    let errors = get_error_messages(events);
    assert!(
        errors.is_empty(),
        "Expected no error events, but found {}: {errors:?}",
        errors.len()
    );
}
