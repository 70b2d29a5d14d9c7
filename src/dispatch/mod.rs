// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command dispatch: correlation ids, response matching and debounce.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use crate::error::{DeviceError, ProtocolError, Result};
use crate::protocol::{CommandMessage, InboundMessage, ResponseOutcome, codec};
use crate::state::{DeviceProperty, PropertyName};
use crate::transport::{SessionEvent, Transport};

mod debounce;

use debounce::DebounceMap;

/// Sends commands over a transport and pairs them with their responses.
///
/// Correlation ids count up from 1 per dispatcher, so two device sessions
/// in one process can never consume each other's responses. Bursty
/// setters go through [`send_debounced`](Self::send_debounced), which
/// holds a per-method timer and only sends the last value seen inside the
/// window.
#[derive(Debug)]
pub(crate) struct CommandDispatcher<T> {
    transport: Arc<T>,
    next_id: AtomicI64,
    debounce: DebounceMap,
    response_timeout: Duration,
    debounce_window: Duration,
}

impl<T: Transport + Send + Sync + 'static> CommandDispatcher<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        response_timeout: Duration,
        debounce_window: Duration,
    ) -> Self {
        Self {
            transport,
            next_id: AtomicI64::new(1),
            debounce: DebounceMap::new(),
            response_timeout,
            debounce_window,
        }
    }

    /// Assigns the next correlation id, sends the command and waits for
    /// the matching response.
    ///
    /// The event subscription is taken before the write so the response
    /// cannot slip past, and it is dropped on every exit path.
    pub(crate) async fn send_command(&self, mut command: CommandMessage) -> Result<Vec<String>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        command.id = id;
        let line = command.to_line()?;

        let mut events = self.transport.subscribe();
        tracing::debug!(id, method = %command.method, "sending command");
        self.transport.send(&line).await.map_err(|error| {
            tracing::debug!(id, error = %error, "command write failed");
            error
        })?;

        // Safe: response timeouts are nowhere near u64::MAX milliseconds.
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = self.response_timeout.as_millis() as u64;

        let awaited = tokio::time::timeout(self.response_timeout, async {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Message(value)) => {
                        if let Some(InboundMessage::Response(response)) = codec::classify(&value)
                            && response.id == id
                        {
                            return Ok(response.outcome);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(id, skipped, "event stream lagged while awaiting response");
                    }
                    Err(RecvError::Closed) => {
                        return Err(ProtocolError::ChannelClosed(
                            "transport event stream".to_string(),
                        ));
                    }
                }
            }
        })
        .await;

        let outcome = match awaited {
            Ok(outcome) => outcome?,
            Err(_elapsed) => {
                tracing::error!(id, command = %line, timeout_ms, "no response before deadline");
                return Err(ProtocolError::CommandTimeout(timeout_ms).into());
            }
        };

        match outcome {
            ResponseOutcome::Result(values) => Ok(values),
            ResponseOutcome::Error { code, message } => {
                tracing::error!(id, code, message = %message, "device rejected command");
                Err(DeviceError::CommandFailed { code, message }.into())
            }
        }
    }

    /// Queries the device for the given properties and returns them as a
    /// typed record.
    pub(crate) async fn get_prop(&self, names: &[PropertyName]) -> Result<DeviceProperty> {
        let values = self.send_command(CommandMessage::get_prop(names)).await?;
        Ok(codec::coerce_get_prop(names, &values))
    }

    /// Enqueues a command behind its method's debounce window and returns
    /// immediately. A newer command for the same method inside the window
    /// supersedes this one; failures of the eventual send are logged and
    /// swallowed.
    pub(crate) fn send_debounced(self: &Arc<Self>, command: CommandMessage) {
        let method = command.method;
        let generation = self.debounce.arm(method);
        tracing::debug!(method = %method, generation, "debounce timer armed");

        let dispatcher = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(dispatcher.debounce_window).await;
            if !dispatcher.debounce.try_claim(method, generation) {
                return;
            }
            if let Err(error) = dispatcher.send_command(command).await {
                tracing::warn!(method = %method, error = %error, "debounced command failed");
            }
        });
        self.debounce.attach(method, generation, handle);
    }

    /// Aborts every armed debounce timer. Nothing queued survives a
    /// disconnect or teardown.
    pub(crate) fn cancel_pending(&self) {
        self.debounce.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::protocol::CommandMethod;
    use crate::transport::mock::MockTransport;
    use crate::types::{Brightness, ColorTemperature, LightType, Power, Transition};
    use serde_json::{Value, json};

    const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
    const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

    fn dispatcher(mock: &MockTransport) -> Arc<CommandDispatcher<MockTransport>> {
        mock.connect();
        Arc::new(CommandDispatcher::new(
            Arc::new(mock.clone()),
            RESPONSE_TIMEOUT,
            DEBOUNCE_WINDOW,
        ))
    }

    fn brightness_command(value: u8) -> CommandMessage {
        CommandMessage::set_brightness(
            LightType::Main,
            Brightness::clamped(value),
            Transition::smooth(250),
        )
    }

    fn sent_json(mock: &MockTransport) -> Vec<Value> {
        mock.sent_lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_last_value() {
        let mock = MockTransport::auto_ok();
        let dispatcher = dispatcher(&mock);

        dispatcher.send_debounced(brightness_command(10));
        dispatcher.send_debounced(brightness_command(20));
        dispatcher.send_debounced(brightness_command(80));
        tokio::time::sleep(DEBOUNCE_WINDOW + Duration::from_millis(100)).await;

        let sent = sent_json(&mock);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["method"], "set_bright");
        assert_eq!(sent[0]["params"][0], 80);
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_methods_do_not_interfere() {
        let mock = MockTransport::auto_ok();
        let dispatcher = dispatcher(&mock);

        dispatcher.send_debounced(brightness_command(40));
        dispatcher.send_debounced(CommandMessage::set_color_temperature(
            LightType::Main,
            ColorTemperature::NEUTRAL,
            Transition::smooth(250),
        ));
        tokio::time::sleep(DEBOUNCE_WINDOW + Duration::from_millis(100)).await;

        let mut methods = mock.sent_methods();
        methods.sort_unstable();
        assert_eq!(methods, vec!["set_bright", "set_ct_abx"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_pending_drops_armed_timers() {
        let mock = MockTransport::auto_ok();
        let dispatcher = dispatcher(&mock);

        dispatcher.send_debounced(brightness_command(60));
        dispatcher.cancel_pending();
        tokio::time::sleep(DEBOUNCE_WINDOW * 2).await;

        assert_eq!(mock.sent_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn responses_match_by_id_regardless_of_order() {
        let mock = MockTransport::silent();
        let dispatcher = dispatcher(&mock);

        let first = dispatcher.send_command(CommandMessage::new(CommandMethod::CronGet, vec![]));
        let second = dispatcher.send_command(CommandMessage::new(CommandMethod::CronGet, vec![]));
        let replies = async {
            tokio::task::yield_now().await;
            mock.emit_message(json!({"id": 2, "result": ["two"]}));
            mock.emit_message(json!({"id": 1, "result": ["one"]}));
        };

        let (first, second, ()) = tokio::join!(first, second, replies);
        assert_eq!(first.unwrap(), vec!["one"]);
        assert_eq!(second.unwrap(), vec!["two"]);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_releases_the_listener_and_ignores_late_replies() {
        let mock = MockTransport::silent();
        let dispatcher = dispatcher(&mock);
        let baseline = mock.subscriber_count();

        let result = dispatcher
            .send_command(CommandMessage::new(CommandMethod::CronGet, vec![]))
            .await;
        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::CommandTimeout(5000)))
        ));
        assert_eq!(mock.subscriber_count(), baseline);

        // A straggler for the timed-out id goes nowhere.
        mock.emit_message(json!({"id": 1, "result": ["late"]}));

        mock.set_responder(|command| {
            let id = command.get("id")?.as_i64()?;
            Some(json!({"id": id, "result": ["ok"]}))
        });
        let values = dispatcher
            .send_command(CommandMessage::new(CommandMethod::CronGet, vec![]))
            .await
            .unwrap();
        assert_eq!(values, vec!["ok"]);
    }

    #[tokio::test(start_paused = true)]
    async fn device_errors_surface_with_code_and_message() {
        let mock = MockTransport::respond_with(|command| {
            let id = command.get("id")?.as_i64()?;
            Some(json!({"id": id, "error": {"code": -5000, "message": "general error"}}))
        });
        let dispatcher = dispatcher(&mock);

        let result = dispatcher
            .send_command(CommandMessage::new(CommandMethod::SetDefault, vec![]))
            .await;
        match result {
            Err(Error::Device(DeviceError::CommandFailed { code, message })) => {
                assert_eq!(code, -5000);
                assert_eq!(message, "general error");
            }
            other => panic!("expected device error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn get_prop_returns_a_typed_record() {
        let mock = MockTransport::respond_with(|command| {
            let id = command.get("id")?.as_i64()?;
            assert_eq!(command["method"], "get_prop");
            Some(json!({"id": id, "result": ["on", "80"]}))
        });
        let dispatcher = dispatcher(&mock);

        let record = dispatcher
            .get_prop(&[PropertyName::Power, PropertyName::Bright])
            .await
            .unwrap();
        assert_eq!(record.power, Some(Power::On));
        assert_eq!(record.bright.map(|b| b.value()), Some(80));
    }

    #[tokio::test(start_paused = true)]
    async fn ids_count_up_from_one() {
        let mock = MockTransport::auto_ok();
        let dispatcher = dispatcher(&mock);

        dispatcher
            .send_command(CommandMessage::new(CommandMethod::CronGet, vec![]))
            .await
            .unwrap();
        dispatcher
            .send_command(CommandMessage::new(CommandMethod::CronGet, vec![]))
            .await
            .unwrap();

        let sent = sent_json(&mock);
        assert_eq!(sent[0]["id"], 1);
        assert_eq!(sent[1]["id"], 2);
    }
}
