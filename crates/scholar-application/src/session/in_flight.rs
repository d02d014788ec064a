use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;

use super::controller::Completion;

/// Replies that have been dispatched but not yet applied.
///
/// Completions come out in the order the requests resolve, not the order
/// they were issued.
#[derive(Default)]
pub struct InFlightReplies {
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl InFlightReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a dispatched reply.
    pub fn push(&mut self, reply: BoxFuture<'static, Completion>) {
        self.pending.push(reply);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Waits for the next reply to resolve.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next(&mut self) -> Option<Completion> {
        self.pending.next().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use scholar_core::transport::{AssistantReply, TransportFailure};
    use tokio::sync::oneshot;

    fn completion(session_id: &str, content: &str) -> Completion {
        Completion {
            session_id: session_id.to_string(),
            outcome: Ok(AssistantReply {
                content: content.to_string(),
                visualizations: Vec::new(),
            }),
        }
    }

    #[tokio::test]
    async fn test_yields_in_resolution_order() {
        let (first_tx, first_rx) = oneshot::channel::<()>();
        let (second_tx, second_rx) = oneshot::channel::<()>();
        let mut in_flight = InFlightReplies::new();

        in_flight.push(
            async move {
                let _ = first_rx.await;
                completion("a", "first issued")
            }
            .boxed(),
        );
        in_flight.push(
            async move {
                let _ = second_rx.await;
                completion("b", "second issued")
            }
            .boxed(),
        );
        assert_eq!(in_flight.len(), 2);

        second_tx.send(()).unwrap();
        assert_eq!(in_flight.next().await.unwrap().session_id, "b");

        first_tx.send(()).unwrap();
        assert_eq!(in_flight.next().await.unwrap().session_id, "a");

        assert!(in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_next_on_empty_is_none() {
        let mut in_flight = InFlightReplies::new();
        assert!(in_flight.next().await.is_none());
    }

    #[tokio::test]
    async fn test_failures_pass_through() {
        let mut in_flight = InFlightReplies::new();
        in_flight.push(
            async {
                Completion {
                    session_id: "a".to_string(),
                    outcome: Err(TransportFailure::Network("refused".to_string())),
                }
            }
            .boxed(),
        );

        let done = in_flight.next().await.unwrap();
        assert!(done.outcome.is_err());
    }
}
