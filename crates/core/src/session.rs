//! One user's pass through input → analyzing → result.
//!
//! Only one analysis may be in flight. Each submission is stamped with a ticket;
//! a completion whose ticket no longer matches the session (because the user
//! reset, or a newer submission replaced it) is discarded.

use crate::domain::analysis::ConsultantAnalysis;
use crate::domain::financial::FinancialInput;
use crate::llm::error::AnalysisError;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(Uuid);

impl Ticket {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Input {
        error: Option<String>,
    },
    Analyzing {
        ticket: Ticket,
        input: Arc<FinancialInput>,
    },
    Result {
        input: Arc<FinancialInput>,
        analysis: Arc<ConsultantAnalysis>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A request is already in flight.
    Busy,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Busy => f.write_str("an analysis is already in progress"),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Input { error: None },
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, SessionState::Analyzing { .. })
    }

    /// Starts an analysis. Rejected while another one is in flight.
    pub fn submit(
        &mut self,
        input: FinancialInput,
    ) -> Result<(Ticket, Arc<FinancialInput>), SessionError> {
        if self.is_analyzing() {
            return Err(SessionError::Busy);
        }
        let ticket = Ticket::new();
        let input = Arc::new(input);
        self.state = SessionState::Analyzing {
            ticket,
            input: Arc::clone(&input),
        };
        Ok((ticket, input))
    }

    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<ConsultantAnalysis, AnalysisError>,
    ) -> Completion {
        let input = match &self.state {
            SessionState::Analyzing { ticket: current, input } if *current == ticket => {
                Arc::clone(input)
            }
            _ => {
                tracing::info!(%ticket, "discarding stale analysis result");
                return Completion::Discarded;
            }
        };

        self.state = match outcome {
            Ok(analysis) => SessionState::Result {
                input,
                analysis: Arc::new(analysis),
            },
            Err(err) => {
                tracing::warn!(%ticket, error = %err, "analysis failed");
                // Form values are not kept: the user starts from a blank form.
                SessionState::Input {
                    error: Some(err.user_message().to_string()),
                }
            }
        };
        Completion::Applied
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Input { error: None };
    }

    pub fn result(&self) -> Option<(&FinancialInput, &ConsultantAnalysis)> {
        match &self.state {
            SessionState::Result { input, analysis } => Some((input.as_ref(), analysis.as_ref())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::ScoreSection;
    use crate::llm::error::USER_MESSAGE;
    use crate::llm::Provider;

    fn input(name: &str) -> FinancialInput {
        FinancialInput {
            company_name: name.to_string(),
            ..Default::default()
        }
    }

    fn analysis() -> ConsultantAnalysis {
        let section = ScoreSection {
            score: 50,
            title: "t".to_string(),
            summary: "s".to_string(),
            details: "d".to_string(),
        };
        ConsultantAnalysis {
            profitability: section.clone(),
            safety: section.clone(),
            growth: section,
            overall_summary: "ok".to_string(),
            business_challenges: vec![],
            recommendations: vec![],
        }
    }

    #[test]
    fn submit_then_complete_reaches_result() {
        let mut session = Session::new();
        let (ticket, _) = session.submit(input("A")).unwrap();
        assert!(session.is_analyzing());

        assert_eq!(session.complete(ticket, Ok(analysis())), Completion::Applied);
        let (input, analysis) = session.result().unwrap();
        assert_eq!(input.company_name, "A");
        assert_eq!(analysis.overall_summary, "ok");
    }

    #[test]
    fn second_submit_while_analyzing_is_rejected() {
        let mut session = Session::new();
        let (ticket, _) = session.submit(input("A")).unwrap();
        assert_eq!(session.submit(input("B")).unwrap_err(), SessionError::Busy);

        match session.state() {
            SessionState::Analyzing { ticket: t, input } => {
                assert_eq!(*t, ticket);
                assert_eq!(input.company_name, "A");
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn failure_returns_to_input_with_message() {
        let mut session = Session::new();
        let (ticket, _) = session.submit(input("A")).unwrap();
        let err = AnalysisError::service(Provider::Gemini, "http", "status=500");

        assert_eq!(session.complete(ticket, Err(err)), Completion::Applied);
        match session.state() {
            SessionState::Input { error } => assert_eq!(error.as_deref(), Some(USER_MESSAGE)),
            other => panic!("unexpected state: {other:?}"),
        }
        // The user may resubmit after an error.
        assert!(session.submit(input("A")).is_ok());
    }

    #[test]
    fn result_after_reset_is_discarded() {
        let mut session = Session::new();
        let (ticket, _) = session.submit(input("A")).unwrap();
        session.reset();

        assert_eq!(session.complete(ticket, Ok(analysis())), Completion::Discarded);
        assert!(matches!(session.state(), SessionState::Input { error: None }));
    }

    #[test]
    fn stale_ticket_does_not_clobber_newer_request() {
        let mut session = Session::new();
        let (old, _) = session.submit(input("A")).unwrap();
        session.reset();
        let (new, _) = session.submit(input("B")).unwrap();

        assert_eq!(session.complete(old, Ok(analysis())), Completion::Discarded);
        assert!(session.is_analyzing());
        assert_eq!(session.complete(new, Ok(analysis())), Completion::Applied);
        assert_eq!(session.result().unwrap().0.company_name, "B");
    }

    #[test]
    fn submitting_from_result_starts_over() {
        let mut session = Session::new();
        let (ticket, _) = session.submit(input("A")).unwrap();
        session.complete(ticket, Ok(analysis()));

        assert!(session.submit(input("B")).is_ok());
        assert!(session.result().is_none());
    }
}
