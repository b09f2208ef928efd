//! The generate → parse → validate → retry loop.
//!
//! Each attempt asks a [`LessonSource`] for a lesson, parses the JSON it
//! returns and runs the dialect validator on it. A valid lesson is rewritten
//! and returned. Transport and parse failures, as well as lessons that fail
//! validation, are retried after a linearly growing delay until
//! `max_attempts` is reached. If the last attempt produced a lesson that
//! failed validation, that lesson is returned anyway. If it failed with a
//! transport or parse error, the run fails.

use std::time::Duration;

use darija_utils::{Lesson, text_cleanup, validation};
use serde::Serialize;

pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(
        "Failed to generate lesson after {attempts} attempts: {}",
        .failures.last().map(String::as_str).unwrap_or("no response")
    )]
    Failed { attempts: u32, failures: Vec<String> },
}

/// The text-generation API, seen as "one call, one raw response".
#[allow(async_fn_in_trait)]
pub trait LessonSource {
    async fn complete(&self) -> Result<String, GenerationError>;
}

pub trait Backoff {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    fn delay(&self, attempt: u32) -> Duration;
}

/// `step × attempt`: 1s, 2s, 3s, ... by default.
#[derive(Debug, Clone, Copy)]
pub struct LinearBackoff {
    pub step: Duration,
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self {
            step: Duration::from_secs(1),
        }
    }
}

impl Backoff for LinearBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        self.step * attempt
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

impl Backoff for NoBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptOutcome {
    Success,
    InvalidDialect,
    ApiError,
    ParseError,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationAttempt {
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
    pub lesson: Option<Lesson>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub lesson: Lesson,
    /// False when the lesson is the fail-open fallback of an exhausted run.
    pub validated: bool,
    pub attempts: Vec<GenerationAttempt>,
}

#[derive(Debug)]
enum State {
    Idle,
    Requesting { attempt: u32 },
    Parsing { attempt: u32, raw: String },
    Validating { attempt: u32, lesson: Lesson },
    Retrying { attempt: u32 },
    Accepted(Lesson),
    Exhausted(Lesson),
    Failed,
}

pub struct Orchestrator<S, B = LinearBackoff> {
    source: S,
    backoff: B,
    max_attempts: u32,
}

impl<S: LessonSource> Orchestrator<S> {
    pub fn new(source: S) -> Self {
        Self::with_backoff(source, LinearBackoff::default())
    }
}

impl<S: LessonSource, B: Backoff> Orchestrator<S, B> {
    pub fn with_backoff(source: S, backoff: B) -> Self {
        Self {
            source,
            backoff,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn generate_lesson(&self) -> Result<Lesson, GenerationError> {
        self.generate_with_report().await.map(|report| report.lesson)
    }

    pub async fn generate_with_report(&self) -> Result<GenerationReport, GenerationError> {
        let mut attempts: Vec<GenerationAttempt> = Vec::new();
        let mut state = State::Idle;

        loop {
            state = match state {
                State::Idle => State::Requesting { attempt: 1 },
                State::Requesting { attempt } => {
                    log::info!(
                        "Generating lesson attempt {attempt}/{}...",
                        self.max_attempts
                    );
                    match self.source.complete().await {
                        Ok(raw) => State::Parsing { attempt, raw },
                        Err(e) => {
                            log::error!("Attempt {attempt} failed: {e}");
                            attempts.push(GenerationAttempt {
                                attempt_number: attempt,
                                outcome: AttemptOutcome::ApiError,
                                lesson: None,
                                error: Some(e.to_string()),
                            });
                            self.after_error(attempt)
                        }
                    }
                }
                State::Parsing { attempt, raw } => match parse_lesson(&raw) {
                    Ok(lesson) => State::Validating { attempt, lesson },
                    Err(e) => {
                        log::error!("Attempt {attempt} failed: {e}");
                        attempts.push(GenerationAttempt {
                            attempt_number: attempt,
                            outcome: AttemptOutcome::ParseError,
                            lesson: None,
                            error: Some(e.to_string()),
                        });
                        self.after_error(attempt)
                    }
                },
                State::Validating { attempt, lesson } => {
                    if validation::validate_lesson(&lesson) {
                        log::info!("Lesson generated in authentic Darija on attempt {attempt}");
                        attempts.push(GenerationAttempt {
                            attempt_number: attempt,
                            outcome: AttemptOutcome::Success,
                            lesson: Some(lesson.clone()),
                            error: None,
                        });
                        State::Accepted(lesson.map_dialect_text(text_cleanup::rewrite))
                    } else {
                        log::info!("Attempt {attempt} failed Darija validation");
                        attempts.push(GenerationAttempt {
                            attempt_number: attempt,
                            outcome: AttemptOutcome::InvalidDialect,
                            lesson: Some(lesson.clone()),
                            error: None,
                        });
                        self.after_rejection(attempt, lesson)
                    }
                }
                State::Retrying { attempt } => {
                    let delay = self.backoff.delay(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    State::Requesting {
                        attempt: attempt + 1,
                    }
                }
                State::Accepted(lesson) => {
                    return Ok(GenerationReport {
                        lesson,
                        validated: true,
                        attempts,
                    });
                }
                State::Exhausted(lesson) => {
                    log::warn!("All attempts failed validation, returning last attempt");
                    return Ok(GenerationReport {
                        lesson,
                        validated: false,
                        attempts,
                    });
                }
                State::Failed => {
                    let failures = attempts
                        .into_iter()
                        .filter_map(|a| {
                            a.error
                                .map(|e| format!("attempt {}: {e}", a.attempt_number))
                        })
                        .collect();
                    return Err(GenerationError::Failed {
                        attempts: self.max_attempts,
                        failures,
                    });
                }
            };
        }
    }

    /// A transport or parse failure on the last attempt fails the run.
    fn after_error(&self, attempt: u32) -> State {
        if attempt < self.max_attempts {
            State::Retrying { attempt }
        } else {
            State::Failed
        }
    }

    /// A rejected lesson on the last attempt is returned as is.
    fn after_rejection(&self, attempt: u32, lesson: Lesson) -> State {
        if attempt < self.max_attempts {
            State::Retrying { attempt }
        } else {
            State::Exhausted(lesson)
        }
    }
}

/// Parses a model response into a lesson
///
/// Code fences are stripped first. If the remainder is not valid JSON, the
/// span from the first `{` to the last `}` is tried instead.
pub fn parse_lesson(raw: &str) -> Result<Lesson, GenerationError> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    match serde_json::from_str::<Lesson>(cleaned) {
        Ok(lesson) => Ok(lesson),
        Err(first_error) => {
            log::debug!("JSON parse failed ({first_error}), attempting to extract an object");
            let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
                return Err(GenerationError::Parse(
                    "No valid JSON found in response".to_string(),
                ));
            };
            if end < start {
                return Err(GenerationError::Parse(
                    "No valid JSON found in response".to_string(),
                ));
            }
            serde_json::from_str::<Lesson>(&cleaned[start..=end])
                .map_err(|e| GenerationError::Parse(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darija_utils::LessonChunk;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    const GOOD: &str = "أ صاحبي، باغي نقوليك واش عرفتي هاد الشي مهم كايخدم في الدار";
    const BAD: &str = "لديك درس مهم";

    fn lesson_json(title: &str, text: &str) -> String {
        let lesson = Lesson {
            title: title.to_string(),
            estimated_time: "10:00".to_string(),
            chunks: (1..=4)
                .map(|id| LessonChunk {
                    id,
                    title: format!("chunk {id}"),
                    dialect_text: text.to_string(),
                    ..Default::default()
                })
                .collect(),
        };
        serde_json::to_string(&lesson).unwrap()
    }

    /// Replays canned responses; repeats the last one forever.
    struct StubSource {
        responses: Mutex<VecDeque<Result<String, GenerationError>>>,
        fallback: fn(u32) -> Result<String, GenerationError>,
        calls: AtomicU32,
    }

    impl StubSource {
        fn always(fallback: fn(u32) -> Result<String, GenerationError>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback,
                calls: AtomicU32::new(0),
            }
        }

        fn then(self, response: Result<String, GenerationError>) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LessonSource for StubSource {
        async fn complete(&self) -> Result<String, GenerationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.responses.lock().unwrap().pop_front() {
                Some(response) => response,
                None => (self.fallback)(call),
            }
        }
    }

    #[derive(Default)]
    struct RecordingBackoff {
        attempts: Mutex<Vec<u32>>,
    }

    impl Backoff for &RecordingBackoff {
        fn delay(&self, attempt: u32) -> Duration {
            self.attempts.lock().unwrap().push(attempt);
            Duration::ZERO
        }
    }

    fn invalid_lesson(call: u32) -> Result<String, GenerationError> {
        Ok(lesson_json(&format!("attempt {call}"), BAD))
    }

    fn transport_failure(call: u32) -> Result<String, GenerationError> {
        Err(GenerationError::Transport(format!("connection refused ({call})")))
    }

    fn valid_lesson(_call: u32) -> Result<String, GenerationError> {
        Ok(lesson_json("valid", GOOD))
    }

    #[tokio::test]
    async fn test_first_valid_lesson_is_rewritten() {
        let orchestrator = Orchestrator::with_backoff(StubSource::always(valid_lesson), NoBackoff);
        let report = orchestrator.generate_with_report().await.unwrap();

        assert!(report.validated);
        assert_eq!(orchestrator.source().calls(), 1);
        assert_eq!(report.attempts[0].outcome, AttemptOutcome::Success);
        for chunk in &report.lesson.chunks {
            assert!(chunk.dialect_text.contains("ف الدار"));
            assert!(!chunk.dialect_text.contains("في الدار"));
        }
    }

    #[tokio::test]
    async fn test_exhausted_validation_returns_last_lesson() {
        let orchestrator =
            Orchestrator::with_backoff(StubSource::always(invalid_lesson), NoBackoff);
        let report = orchestrator.generate_with_report().await.unwrap();

        assert_eq!(orchestrator.source().calls(), 5);
        assert!(!report.validated);
        assert_eq!(report.lesson.title, "attempt 5");
        // the fallback lesson is returned as parsed, without rewriting
        assert_eq!(report.lesson.chunks[0].dialect_text, BAD);
        assert!(
            report
                .attempts
                .iter()
                .all(|a| a.outcome == AttemptOutcome::InvalidDialect)
        );
    }

    #[tokio::test]
    async fn test_transport_failures_exhaust_into_error() {
        let orchestrator =
            Orchestrator::with_backoff(StubSource::always(transport_failure), NoBackoff);
        let err = orchestrator.generate_lesson().await.unwrap_err();

        assert_eq!(orchestrator.source().calls(), 5);
        match &err {
            GenerationError::Failed { attempts, failures } => {
                assert_eq!(*attempts, 5);
                assert_eq!(failures.len(), 5);
                assert!(failures[4].contains("connection refused (5)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.starts_with("Failed to generate lesson after 5 attempts"));
        assert!(message.contains("connection refused (5)"));
    }

    #[tokio::test]
    async fn test_retries_until_valid() {
        let source = StubSource::always(valid_lesson)
            .then(transport_failure(1))
            .then(Ok("not json at all".to_string()))
            .then(invalid_lesson(3));
        let backoff = RecordingBackoff::default();
        let orchestrator = Orchestrator::with_backoff(source, &backoff);
        let report = orchestrator.generate_with_report().await.unwrap();

        assert!(report.validated);
        assert_eq!(orchestrator.source().calls(), 4);
        let outcomes = report.attempts.iter().map(|a| a.outcome).collect::<Vec<_>>();
        assert_eq!(
            outcomes,
            vec![
                AttemptOutcome::ApiError,
                AttemptOutcome::ParseError,
                AttemptOutcome::InvalidDialect,
                AttemptOutcome::Success,
            ]
        );
        assert_eq!(*backoff.attempts.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_no_wait_after_final_attempt() {
        let backoff = RecordingBackoff::default();
        let orchestrator =
            Orchestrator::with_backoff(StubSource::always(invalid_lesson), &backoff);
        orchestrator.generate_lesson().await.unwrap();
        assert_eq!(*backoff.attempts.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_error_on_last_attempt_fails_despite_earlier_lesson() {
        let source = StubSource::always(transport_failure).then(invalid_lesson(1));
        let orchestrator = Orchestrator::with_backoff(source, NoBackoff);
        let err = orchestrator.generate_lesson().await.unwrap_err();

        assert_eq!(orchestrator.source().calls(), 5);
        match err {
            GenerationError::Failed { attempts, failures } => {
                assert_eq!(attempts, 5);
                // the rejected first attempt carries no error message
                assert_eq!(failures.len(), 4);
                assert!(failures[3].contains("connection refused (5)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parse_error_on_last_attempt_fails() {
        let source = StubSource::always(|_| Ok("still not json".to_string()))
            .then(invalid_lesson(1))
            .then(invalid_lesson(2));
        let orchestrator = Orchestrator::with_backoff(source, NoBackoff).max_attempts(3);
        let err = orchestrator.generate_lesson().await.unwrap_err();

        assert!(matches!(err, GenerationError::Failed { attempts: 3, .. }));
        assert!(err.to_string().contains("No valid JSON found in response"));
    }

    #[test]
    fn test_linear_backoff() {
        let backoff = LinearBackoff::default();
        let delays = (1..=4).map(|a| backoff.delay(a).as_secs()).collect::<Vec<_>>();
        assert_eq!(delays, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_fenced_response() {
        let raw = format!("```json\n{}\n```", lesson_json("fenced", GOOD));
        assert_eq!(parse_lesson(&raw).unwrap().title, "fenced");
    }

    #[test]
    fn test_parse_recovers_object_from_prose() {
        let raw = format!("Here is your lesson: {} Enjoy!", lesson_json("prose", GOOD));
        let lesson = parse_lesson(&raw).unwrap();
        assert_eq!(lesson.title, "prose");
        assert_eq!(lesson.chunks.len(), 4);
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            parse_lesson("no braces here"),
            Err(GenerationError::Parse(_))
        ));
        assert!(matches!(
            parse_lesson("} backwards {"),
            Err(GenerationError::Parse(_))
        ));
        assert!(matches!(
            parse_lesson(r#"{"title": "no chunks"}"#),
            Err(GenerationError::Parse(_))
        ));
    }
}
