//! # Reactor
//!
//! The single-threaded event loop tying every module together: on each
//! readable event it drains every pending UDP datagram into the receive
//! buffer, then decodes and dispatches every binary frame that buffer now
//! yields before returning — non-preemptive, matching `IIPSComm`'s
//! `SlotReceiveData`, which drains its socket's `readAll()` in one call
//! rather than processing one packet per event-loop tick.

use crate::buffer::ReceiveBuffer;
use crate::codec::binary::{self, BinaryFrame};
use crate::config::IipsConfig;
use crate::connection::ConnectionMonitor;
use crate::constants::{
    MISSION_CONTROL_PAYLOAD_LEN, PACKET_ID_ACK, PACKET_ID_FOLLOW, PACKET_ID_HEARTBEAT,
    PACKET_ID_LINE, PACKET_ID_REGION, PACKET_ID_STANDBY, PACKET_ID_SURVEY, SUBPHASE_END,
    SUBPHASE_RESPONSE, SUBPHASE_START, SUBPHASE_WAYPOINT,
};
use crate::error::IipsError;
use crate::logging::{log_debug, log_warn};
use crate::mission::assembler::MissionAssembler;
use crate::mission::plan::{PlanEmitter, PlanType};
use crate::observer::{IipsEvent, ObserverRegistry};
use crate::status::{encode_status_frame, StatusRecord};
use crate::transport::UdpEndpoint;
use std::net::SocketAddr;
use std::time::Duration;

const RECEIVE_BUFFER_CAPACITY: usize = 8192;

/// Owns every stateful piece of the ground link and drives it from decoded
/// frames.
pub struct Reactor {
    buffer: ReceiveBuffer,
    endpoint: UdpEndpoint,
    assembler: MissionAssembler,
    connection: ConnectionMonitor,
    observers: ObserverRegistry,
    plan_emitter: Box<dyn PlanEmitter>,
}

impl Reactor {
    pub async fn new(config: &IipsConfig, plan_emitter: Box<dyn PlanEmitter>) -> Self {
        let local_addr: SocketAddr = format!("0.0.0.0:{}", config.local_port)
            .parse()
            .expect("local_port always yields a valid socket address");
        let peer_addr: SocketAddr = format!("{}:{}", config.peer_ip, config.peer_port)
            .parse()
            .unwrap_or_else(|_| {
                log_warn(&format!(
                    "invalid peer address {}:{}, falling back to loopback",
                    config.peer_ip, config.peer_port
                ));
                SocketAddr::from(([127, 0, 0, 1], config.peer_port))
            });

        let mut assembler = MissionAssembler::new();
        assembler.bind_vehicle(config.bound_vehicle_id);

        Self {
            buffer: ReceiveBuffer::new(RECEIVE_BUFFER_CAPACITY),
            endpoint: UdpEndpoint::bind(local_addr, peer_addr).await,
            assembler,
            connection: ConnectionMonitor::new(Duration::from_secs(config.watchdog_timeout_secs)),
            observers: ObserverRegistry::new(),
            plan_emitter,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn crate::observer::Observer>) {
        self.observers.subscribe(observer);
    }

    pub fn connection_state(&self) -> crate::connection::ConnectionState {
        self.connection.state()
    }

    /// Waits for the socket to become readable, bounded by however long is
    /// left on the watchdog. On a normal wakeup, drains every pending
    /// datagram and dispatches every frame it yields; on a watchdog expiry,
    /// flips the connection to disconnected instead. This single bounded
    /// wait is what replaces a `select!` between reading and watchdog
    /// timing — both would otherwise need an overlapping mutable borrow of
    /// the reactor for the same tick.
    pub async fn poll_once(&mut self) -> Result<(), IipsError> {
        let budget = self.connection.remaining_timeout();
        match tokio::time::timeout(budget, self.endpoint.readable()).await {
            Ok(()) => {
                self.endpoint.drain_into(&mut self.buffer).await;
                while let Some(frame) = binary::decode(&mut self.buffer) {
                    self.dispatch(frame).await?;
                }
            }
            Err(_elapsed) => {
                self.connection.expire(&self.observers);
            }
        }
        Ok(())
    }

    /// Encodes and sends one telemetry status frame to the peer.
    pub async fn send_status(&self, record: &StatusRecord) -> Result<(), IipsError> {
        let bytes = encode_status_frame(record)?;
        self.endpoint.send(&bytes).await;
        Ok(())
    }

    async fn dispatch(&mut self, frame: BinaryFrame) -> Result<(), IipsError> {
        match frame.id {
            PACKET_ID_HEARTBEAT => {
                // The watchdog has no other input: only a heartbeat frame
                // (re)arms it, per the original's `case HEARTBEAT:` being the
                // sole caller of `timerIipsConnect.start(...)`.
                self.connection.reset(&self.observers);
                log_debug("heartbeat received");
            }
            PACKET_ID_STANDBY => {
                // Notification only: does not fall through to mission
                // handling the way LINE/REGION/SURVEY does.
                self.observers
                    .publish(IipsEvent::Message("standby".to_string()));
            }
            PACKET_ID_FOLLOW => {
                // Stub only: no mission state machine, just a notification.
                self.observers
                    .publish(IipsEvent::Message("Follow target not ready".to_string()));
            }
            PACKET_ID_LINE | PACKET_ID_REGION | PACKET_ID_SURVEY => {
                self.dispatch_mission_frame(frame).await?;
            }
            other => {
                log_warn(&format!("unrecognized inbound packet id {other}"));
            }
        }
        Ok(())
    }

    async fn dispatch_mission_frame(&mut self, frame: BinaryFrame) -> Result<(), IipsError> {
        let Some(&subphase) = frame.payload.last() else {
            log_warn("mission frame with empty payload, ignoring");
            return Ok(());
        };

        let accepted_sender = match subphase {
            SUBPHASE_START => {
                let Some(plan_type) = PlanType::from_packet_id(frame.id) else {
                    log_warn(&format!("packet id {} does not open a mission upload", frame.id));
                    return Ok(());
                };
                self.assembler.start(plan_type, &frame.payload)
            }
            SUBPHASE_WAYPOINT => self.assembler.waypoint(&frame.payload, &self.observers),
            SUBPHASE_END => {
                self.assembler
                    .end(&frame.payload, self.plan_emitter.as_ref())
                    .await?
            }
            other => {
                log_warn(&format!("unrecognized mission sub-phase byte {other}"));
                None
            }
        };

        if let Some(sender_id) = accepted_sender {
            self.send_ack(sender_id).await?;
        }
        Ok(())
    }

    async fn send_ack(&self, sender_id: u16) -> Result<(), IipsError> {
        let mut payload = [0u8; MISSION_CONTROL_PAYLOAD_LEN];
        payload[0..2].copy_from_slice(&sender_id.to_le_bytes());
        payload[MISSION_CONTROL_PAYLOAD_LEN - 1] = SUBPHASE_RESPONSE;
        let bytes = binary::encode(PACKET_ID_ACK, &payload)?;
        self.endpoint.send(&bytes).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::plan::StubPlanEmitter;

    async fn reactor_on_loopback() -> Reactor {
        let config = IipsConfig {
            local_port: 0,
            peer_ip: "127.0.0.1".to_string(),
            peer_port: 0,
            watchdog_timeout_secs: 3,
            bound_vehicle_id: 7,
        };
        Reactor::new(&config, Box::new(StubPlanEmitter::new())).await
    }

    #[tokio::test]
    async fn binds_successfully_on_ephemeral_port() {
        let reactor = reactor_on_loopback().await;
        assert!(reactor.endpoint.is_bound());
    }

    #[tokio::test]
    async fn heartbeat_frame_connects() {
        let mut reactor = reactor_on_loopback().await;
        assert_eq!(reactor.connection_state(), crate::connection::ConnectionState::Disconnected);
        reactor
            .dispatch(BinaryFrame::new(PACKET_ID_HEARTBEAT, vec![]))
            .await
            .unwrap();
        assert_eq!(reactor.connection_state(), crate::connection::ConnectionState::Connected);
    }

    #[tokio::test]
    async fn non_heartbeat_traffic_does_not_reset_the_watchdog() {
        let mut reactor = reactor_on_loopback().await;
        reactor
            .dispatch(BinaryFrame::new(PACKET_ID_STANDBY, vec![]))
            .await
            .unwrap();
        assert_eq!(
            reactor.connection_state(),
            crate::connection::ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn standby_frame_does_not_start_a_mission() {
        let mut reactor = reactor_on_loopback().await;
        reactor
            .dispatch(BinaryFrame::new(PACKET_ID_STANDBY, vec![]))
            .await
            .unwrap();
        assert_eq!(reactor.assembler.phase(), crate::mission::MissionPhase::Idle);
    }

    #[tokio::test]
    async fn line_start_frame_opens_a_mission() {
        let mut reactor = reactor_on_loopback().await;
        let mut payload = vec![0u8; MISSION_CONTROL_PAYLOAD_LEN];
        payload[0..2].copy_from_slice(&7u16.to_le_bytes());
        payload[MISSION_CONTROL_PAYLOAD_LEN - 1] = SUBPHASE_START;
        reactor
            .dispatch(BinaryFrame::new(PACKET_ID_LINE, payload))
            .await
            .unwrap();
        assert!(matches!(
            reactor.assembler.phase(),
            crate::mission::MissionPhase::Receiving { .. }
        ));
    }
}
