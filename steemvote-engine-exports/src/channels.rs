use steemvote_models::CandidateComment;
use tokio::sync::mpsc;

/// Producer side of the intake queue, held by the monitor
pub type IntakeSender = mpsc::Sender<CandidateComment>;
/// Consumer side of the intake queue, held by the engine
pub type IntakeReceiver = mpsc::Receiver<CandidateComment>;

/// Bounded queue between the monitor and the engine.
/// A full queue makes the monitor wait, it never drops candidates.
pub fn intake_channel(capacity: usize) -> (IntakeSender, IntakeReceiver) {
    mpsc::channel(capacity.max(1))
}
