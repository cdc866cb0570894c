use super::console::Console;
use super::models::{SessionState, WorkItem};
use crate::components::google_calendar::{CalendarApi, CalendarEvent, CalendarRouter, CreatedEvent};
use crate::error::{Error, VestigeResult};
use crate::utils::time::{format_clock_time, format_duration, to_rfc3339, Clock};
use tracing::{debug, error};

/// Answer to the finish prompt that drops the current item
pub const CANCEL_INPUT: &str = "\u{1b}";

const DESCRIPTION_PROMPT: &str = "   ";
const FINISH_PROMPT: &str = "   Hit Enter to finish work / Esc + Enter to cancel ";

/// How one pass through the loop ended
#[derive(Debug)]
pub enum ItemOutcome {
    /// The event was created remotely
    Submitted(CreatedEvent),
    /// The user cancelled before finishing
    Cancelled,
    /// Submission failed; the item is gone and will not be retried
    Failed(Error),
    /// Input ran out
    EndOfInput,
}

enum Step {
    Next(SessionState),
    Done(ItemOutcome),
}

/// Prompt, time and submit work items one after another
pub struct WorkLog<A, K> {
    api: A,
    clock: K,
    router: CalendarRouter,
}

impl<A: CalendarApi, K: Clock> WorkLog<A, K> {
    pub fn new(api: A, clock: K, router: CalendarRouter) -> Self {
        Self { api, clock, router }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Keep handling work items until input runs out.
    ///
    /// Only console failures end the loop with an error; a failed submission
    /// is reported and the loop goes back to waiting for the next item.
    pub async fn run<C: Console + ?Sized>(&mut self, console: &mut C) -> VestigeResult<()> {
        loop {
            if let ItemOutcome::EndOfInput = self.run_item(console).await? {
                debug!("Input closed, ending session");
                return Ok(());
            }
        }
    }

    /// Drive a single work item from `Idle` back to `Idle`
    pub async fn run_item<C: Console + ?Sized>(&mut self, console: &mut C) -> VestigeResult<ItemOutcome> {
        let mut state = SessionState::Idle;

        loop {
            match self.step(state, console).await? {
                Step::Next(next) => state = next,
                Step::Done(outcome) => {
                    if !matches!(outcome, ItemOutcome::EndOfInput) {
                        console.say("-- END WORK ITEM --------------------------");
                        console.say("");
                    }
                    return Ok(outcome);
                }
            }
        }
    }

    async fn step<C: Console + ?Sized>(&mut self, state: SessionState, console: &mut C) -> VestigeResult<Step> {
        match state {
            SessionState::Idle => {
                console.say("");
                console.say("-- NEW WORK ITEM --------------------------");
                console.say(" * What are you working on?");

                let Some(description) = console.ask(DESCRIPTION_PROMPT).await? else {
                    return Ok(Step::Done(ItemOutcome::EndOfInput));
                };

                let item = WorkItem::start(description, self.clock.now());
                console.say("");
                console.say(&format!(" * Started at {}", format_clock_time(&item.start_time)));

                Ok(Step::Next(SessionState::Recording(item)))
            }
            SessionState::Recording(mut item) => {
                match console.ask(FINISH_PROMPT).await? {
                    None => Ok(Step::Done(ItemOutcome::EndOfInput)),
                    Some(answer) if answer == CANCEL_INPUT => {
                        console.say(" * Work item cancelled.");
                        Ok(Step::Done(ItemOutcome::Cancelled))
                    }
                    Some(_) => {
                        item.finish(self.clock.now());
                        Ok(Step::Next(SessionState::Submitting(item)))
                    }
                }
            }
            SessionState::Submitting(item) => {
                if let Some(elapsed) = item.duration() {
                    console.say(&format!(" * Worked for {}", format_duration(elapsed)));
                }
                console.say(" * Sending event to Google...");

                match self.submit(&item).await {
                    Ok(created) => {
                        console.say(&format!(" * Event {} created. Done.", created.id));
                        Ok(Step::Done(ItemOutcome::Submitted(created)))
                    }
                    Err(e) => {
                        error!("Failed to submit work item '{}': {}", item.description, e);
                        console.say(" ! An error occurred:");
                        console.say(&format!(" ! {}", e));
                        console.say(&format!(
                            " ! Not saved: \"{}\" from {} to {}",
                            item.description,
                            to_rfc3339(&item.start_time),
                            item.end_time.as_ref().map(to_rfc3339).unwrap_or_default()
                        ));
                        Ok(Step::Done(ItemOutcome::Failed(e)))
                    }
                }
            }
        }
    }

    async fn submit(&mut self, item: &WorkItem) -> VestigeResult<CreatedEvent> {
        let mut event = CalendarEvent::from_work_item(item)?;
        let calendar_id = self.router.route(&mut event, &self.api).await?;
        self.api.insert_event(&calendar_id, &event).await
    }
}
