use crate::commands::{Command, Session};
use crate::errors::GatorResult;
use crate::services::{parse_interval, Aggregator};

/// `agg <time_between_reqs>`: poll feeds until interrupted.
pub fn agg(session: &mut Session<'_>, command: &Command) -> GatorResult<()> {
    let raw = &command.expect_args(1, "<time_between_reqs>")?[0];
    let interval = parse_interval(raw)?;

    session.shutdown.cancel_on_interrupt();
    Aggregator::new(session.store, session.fetcher).run(interval, &session.shutdown);
    Ok(())
}
