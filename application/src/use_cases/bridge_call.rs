//! Bridge call use case
//!
//! Entry point invoked once per Host tool call. Sequences validation,
//! resolution, admission, translation, dispatch and the trust update, and
//! always answers with a [`BridgeResponse`]:
//!
//! ```text
//! a2a_send:         RECEIVED → RESOLVING → ADMITTING → [DENIED]
//!                                                    → ENCODING → DISPATCHING → DECODING → UPDATING → [COMPLETED]
//!                                                                     └─ failure ─────────→ UPDATING → [FAILED]
//! a2a_discover:     RECEIVED → ADMITTING (per-tool window) → UPDATING → [COMPLETED]
//! a2a_list_agents:  RECEIVED → ADMITTING (per-tool window) → [COMPLETED]
//! ```
//!
//! Exactly one outcome is recorded per dispatched message, including when
//! the caller abandons the invocation mid-dispatch.

use crate::config::BridgeConfig;
use crate::ports::interaction_logger::{InteractionEvent, InteractionLogger, NoInteractionLogger};
use crate::ports::mesh_transport::MeshTransport;
use crate::services::agent_registry::AgentRegistry;
use crate::services::trust_policy::{OutcomeReport, TrustRatePolicy};
use bridge_domain::{
    AgentCard, AgentEndpoint, AgentName, AgentRecord, BridgeError, BridgePhase, BridgeResponse,
    BridgeTool, CorrelationId, DefaultToolValidator, EtiquetteAdvisor, EtiquetteAnnotation,
    PhaseTrail, PolicyDecision, ProtocolTranslator, ToolCall, ToolInvocationContext, ToolSpec,
    ToolValidator, ZoneSeeds,
};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// A failed invocation on its way to becoming a response.
struct Failure {
    error: BridgeError,
    annotation: EtiquetteAnnotation,
    correlation_id: Option<CorrelationId>,
}

impl Failure {
    fn new(error: BridgeError, annotation: EtiquetteAnnotation) -> Self {
        Self {
            error,
            annotation,
            correlation_id: None,
        }
    }
}

impl From<BridgeError> for Failure {
    fn from(error: BridgeError) -> Self {
        Self::new(error, EtiquetteAnnotation::default())
    }
}

/// Records a failure outcome unless settled first.
///
/// Created right before dispatch; dropping it unsettled (the invocation was
/// cancelled or panicked) still counts the attempt against the agent.
struct OutcomeGuard<'a> {
    policy: &'a TrustRatePolicy,
    agent: String,
    at: DateTime<Utc>,
    settled: bool,
}

impl<'a> OutcomeGuard<'a> {
    fn new(policy: &'a TrustRatePolicy, agent: &AgentName, at: DateTime<Utc>) -> Self {
        Self {
            policy,
            agent: agent.as_str().to_string(),
            at,
            settled: false,
        }
    }

    fn settle(mut self, success: bool) -> Option<OutcomeReport> {
        self.settled = true;
        match self.policy.on_outcome(&self.agent, success, self.at) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(agent = %self.agent, error = %e, "Could not record outcome");
                None
            }
        }
    }
}

impl Drop for OutcomeGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(agent = %self.agent, "Invocation abandoned during dispatch; recording failure");
            if let Err(e) = self.policy.on_outcome(&self.agent, false, self.at) {
                warn!(agent = %self.agent, error = %e, "Could not record outcome");
            }
        }
    }
}

/// Use case for serving bridge tool calls
pub struct BridgeOrchestrator<T: MeshTransport + 'static> {
    transport: Arc<T>,
    registry: Arc<AgentRegistry>,
    policy: Arc<TrustRatePolicy>,
    advisor: EtiquetteAdvisor,
    translator: ProtocolTranslator,
    tool_spec: ToolSpec,
    validator: DefaultToolValidator,
    zone_seeds: ZoneSeeds,
    dispatch_timeout: Duration,
    logger: Arc<dyn InteractionLogger>,
}

impl<T: MeshTransport + 'static> BridgeOrchestrator<T> {
    pub fn new(config: &BridgeConfig, transport: Arc<T>) -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let policy = Arc::new(TrustRatePolicy::new(Arc::clone(&registry), config));
        Self {
            transport,
            registry,
            policy,
            advisor: EtiquetteAdvisor::new(config.etiquette.clone()),
            translator: ProtocolTranslator::new(config.identity.as_str()),
            tool_spec: ToolSpec::bridge_tools(),
            validator: DefaultToolValidator,
            zone_seeds: config.zone_seeds.clone(),
            dispatch_timeout: config.dispatch_timeout,
            logger: Arc::new(NoInteractionLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn InteractionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> &Arc<TrustRatePolicy> {
        &self.policy
    }

    pub fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    /// Handles one tool call, stamped with the current time.
    pub async fn handle(&self, call: ToolCall, caller: &str) -> BridgeResponse {
        self.handle_at(call, caller, Utc::now()).await
    }

    /// Handles one tool call as of `requested_at`.
    ///
    /// Never fails and never panics: unexpected faults become
    /// `status: failed, reason: internal-error`.
    pub async fn handle_at(
        &self,
        call: ToolCall,
        caller: &str,
        requested_at: DateTime<Utc>,
    ) -> BridgeResponse {
        let started = Instant::now();
        let tool_name = call.tool_name.clone();
        let target = call
            .get_string("agent_name")
            .or_else(|| call.get_string("endpoint"))
            .map(str::to_string);

        info!(tool = %tool_name, caller, target = target.as_deref(), "Bridge call");

        let response = match AssertUnwindSafe(self.invoke(call, caller, requested_at))
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(tool = %tool_name, message = %message, "Bridge call panicked");
                BridgeResponse::failed(
                    &BridgeError::Internal(message),
                    EtiquetteAnnotation::default(),
                )
            }
        };

        debug!(
            tool = %tool_name,
            status = response.status.as_str(),
            reason = response.reason.as_deref(),
            phase = %response.terminal_phase,
            "Bridge call finished"
        );

        self.logger.log(InteractionEvent::new(
            "tool_call",
            serde_json::json!({
                "tool": tool_name,
                "caller": caller,
                "target": target,
                "status": response.status.as_str(),
                "reason": response.reason,
                "correlationId": response.correlation_id,
                "terminalPhase": response.terminal_phase,
                "durationMs": started.elapsed().as_millis() as u64,
            }),
        ));

        response
    }

    async fn invoke(
        &self,
        call: ToolCall,
        caller: &str,
        requested_at: DateTime<Utc>,
    ) -> BridgeResponse {
        let mut trail = PhaseTrail::new();

        let result = match self.prepare(call, caller, requested_at) {
            Ok(context) => match context.tool() {
                BridgeTool::Discover => self.discover(&context, &mut trail).await,
                BridgeTool::ListAgents => self.list(&context, &mut trail),
                BridgeTool::Send => self.send(&context, &mut trail).await,
            },
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(response) => response.with_phase(trail.current()),
            Err(failure) => {
                trail.fail();
                BridgeResponse::failed(&failure.error, failure.annotation)
                    .with_correlation(failure.correlation_id)
                    .with_phase(trail.current())
            }
        }
    }

    /// Checks the call against the served tool definitions.
    fn prepare(
        &self,
        call: ToolCall,
        caller: &str,
        requested_at: DateTime<Utc>,
    ) -> Result<ToolInvocationContext, BridgeError> {
        let definition = self
            .tool_spec
            .get(&call.tool_name)
            .ok_or_else(|| BridgeError::UnsupportedTool(call.tool_name.clone()))?;
        self.validator
            .validate(&call, definition)
            .map_err(BridgeError::Validation)?;
        ToolInvocationContext::from_call(call, caller, requested_at)
    }

    /// Coarse per-tool admission for operations without a target agent.
    fn admit_tool(
        &self,
        context: &ToolInvocationContext,
        trail: &mut PhaseTrail,
    ) -> Result<Option<BridgeResponse>, Failure> {
        trail.advance(BridgePhase::Admitting)?;
        match self.policy.admit_and_record(context, None) {
            PolicyDecision::Allow => Ok(None),
            PolicyDecision::Deny(reason) => {
                trail.advance(BridgePhase::Denied)?;
                Ok(Some(BridgeResponse::denied(
                    reason,
                    self.advisor.advise_without_agent(context),
                )))
            }
        }
    }

    // ==================== a2a_discover ====================

    async fn discover(
        &self,
        context: &ToolInvocationContext,
        trail: &mut PhaseTrail,
    ) -> Result<BridgeResponse, Failure> {
        let endpoint = AgentEndpoint::parse(context.require_string("endpoint")?)?;

        if let Some(denied) = self.admit_tool(context, trail)? {
            return Ok(denied);
        }

        let card = self.fetch_card(&endpoint).await;
        let name = match card.as_ref().filter(|c| !c.name.trim().is_empty()) {
            Some(card) => AgentName::new(card.name.as_str())?,
            None => AgentName::from_endpoint(&endpoint)?,
        };

        trail.advance(BridgePhase::Updating)?;
        let candidate = AgentRecord::new(
            name.clone(),
            endpoint,
            self.zone_seeds.zone_for(&name),
            context.requested_at(),
        )
        .with_personality(self.zone_seeds.personality_for(&name))
        .with_card(card.as_ref());

        let registration = self.registry.upsert(candidate);
        let record = &registration.record;
        info!(
            agent = %record.name,
            zone = %record.trust_zone,
            status = registration.status.as_str(),
            "Agent discovered"
        );

        trail.advance(BridgePhase::Completed)?;
        Ok(BridgeResponse::ok(
            serde_json::json!({
                "name": record.name.as_str(),
                "endpoint": record.endpoint.as_str(),
                "trustZone": record.trust_zone,
                "status": registration.status,
                "capabilities": record.capabilities,
            }),
            self.advisor.advise(record, context),
        ))
    }

    /// Best-effort card fetch. Failures are not outcomes: the agent is not
    /// known yet.
    async fn fetch_card(&self, endpoint: &AgentEndpoint) -> Option<AgentCard> {
        let fetch = self.transport.fetch_card(endpoint, self.dispatch_timeout);
        match tokio::time::timeout(self.dispatch_timeout, fetch).await {
            Ok(Ok(card)) => Some(card),
            Ok(Err(e)) => {
                debug!(endpoint = %endpoint, error = %e, "Agent card unavailable");
                None
            }
            Err(_) => {
                debug!(endpoint = %endpoint, "Agent card fetch timed out");
                None
            }
        }
    }

    // ==================== a2a_list_agents ====================

    fn list(
        &self,
        context: &ToolInvocationContext,
        trail: &mut PhaseTrail,
    ) -> Result<BridgeResponse, Failure> {
        if let Some(denied) = self.admit_tool(context, trail)? {
            return Ok(denied);
        }

        let listing = self.registry.list();
        let agents: Vec<serde_json::Value> = listing.iter().map(agent_summary).collect();

        trail.advance(BridgePhase::Completed)?;
        Ok(BridgeResponse::ok(
            serde_json::Value::Array(agents),
            self.advisor.advise_without_agent(context),
        ))
    }

    // ==================== a2a_send ====================

    async fn send(
        &self,
        context: &ToolInvocationContext,
        trail: &mut PhaseTrail,
    ) -> Result<BridgeResponse, Failure> {
        trail.advance(BridgePhase::Resolving)?;
        let target = context.require_string("agent_name")?;
        let agent = self
            .registry
            .resolve(target)
            .map_err(|e| Failure::new(e, self.advisor.advise_without_agent(context)))?;

        trail.advance(BridgePhase::Admitting)?;
        if let PolicyDecision::Deny(reason) = self.policy.admit_and_record(context, Some(&agent)) {
            trail.advance(BridgePhase::Denied)?;
            return Ok(BridgeResponse::denied(
                reason,
                self.advisor.advise(&agent, context),
            ));
        }

        trail.advance(BridgePhase::Encoding)?;
        let envelope = self
            .translator
            .encode(context, &agent)
            .map_err(|e| Failure::new(e.into(), self.advisor.advise(&agent, context)))?;
        let correlation_id = envelope.correlation_id.clone();

        trail.advance(BridgePhase::Dispatching)?;
        let guard = OutcomeGuard::new(&self.policy, &agent.name, context.requested_at());

        let dispatched = tokio::time::timeout(
            self.dispatch_timeout,
            self.transport
                .dispatch(&agent.endpoint, &envelope, self.dispatch_timeout),
        )
        .await;

        let outcome = match dispatched {
            Ok(Ok(raw)) => {
                trail.advance(BridgePhase::Decoding)?;
                self.translator
                    .decode(&envelope, &raw)
                    .map_err(BridgeError::from)
            }
            Ok(Err(e)) => Err(BridgeError::from(e)),
            Err(_) => Err(BridgeError::Timeout(self.dispatch_timeout.as_millis() as u64)),
        };

        trail.advance(BridgePhase::Updating)?;
        guard.settle(outcome.is_ok());

        let updated = self.registry.resolve(agent.name.as_str()).unwrap_or(agent);
        let annotation = self.advisor.advise(&updated, context);

        match outcome {
            Ok(result) => {
                trail.advance(BridgePhase::Completed)?;
                let mut data = serde_json::json!({ "reply": result.output });
                if let Some(structured) = result.metadata.structured {
                    data["structured"] = structured;
                }
                Ok(BridgeResponse::ok(data, annotation).with_correlation(Some(correlation_id)))
            }
            Err(error) => {
                warn!(agent = %updated.name, reason = error.reason(), error = %error, "Dispatch failed");
                Err(Failure {
                    error,
                    annotation,
                    correlation_id: Some(correlation_id),
                })
            }
        }
    }
}

/// Listing entry for one agent.
fn agent_summary(record: &AgentRecord) -> serde_json::Value {
    let mut summary = serde_json::json!({
        "name": record.name.as_str(),
        "endpoint": record.endpoint.as_str(),
        "trustZone": record.trust_zone,
        "consecutiveFailures": record.consecutive_failures,
        "discoveredAt": record.discovered_at,
        "capabilities": record.capabilities,
    });
    if let Some(auth) = &record.auth_type {
        summary["authType"] = serde_json::json!(auth);
    }
    if let Some(mode) = record.personality_mode {
        summary["personalityMode"] = serde_json::json!(mode);
    }
    if let Some(at) = record.last_success_at {
        summary["lastSuccessAt"] = serde_json::json!(at);
    }
    if let Some(at) = record.last_failure_at {
        summary["lastFailureAt"] = serde_json::json!(at);
    }
    summary
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mesh_transport::TransportError;
    use async_trait::async_trait;
    use bridge_domain::{
        BridgeStatus, MeshEnvelope, PersonalityMode, RateLimit, ToneHint, TrustRules, TrustZone,
        ZoneSeed,
    };
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// How the mock answers dispatches
    #[derive(Debug, Clone)]
    enum Reply {
        /// Echo the message text back as an agent message
        Echo,
        /// Return this raw body
        Raw(String),
        /// Answer with a JSON-RPC error object
        RemoteError(i64, String),
        /// Fail at the transport level
        Fail(TransportError),
        /// Never answer
        Hang,
        /// Panic inside the transport
        Panic,
    }

    struct MockTransport {
        card: Option<AgentCard>,
        reply: Mutex<Reply>,
        dispatched: Mutex<Vec<MeshEnvelope>>,
        dispatch_started: Notify,
    }

    impl MockTransport {
        fn new(reply: Reply) -> Self {
            Self {
                card: None,
                reply: Mutex::new(reply),
                dispatched: Mutex::new(Vec::new()),
                dispatch_started: Notify::new(),
            }
        }

        fn with_card(mut self, card: AgentCard) -> Self {
            self.card = Some(card);
            self
        }

        fn set_reply(&self, reply: Reply) {
            *self.reply.lock().unwrap() = reply;
        }

        fn dispatch_count(&self) -> usize {
            self.dispatched.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MeshTransport for MockTransport {
        async fn fetch_card(
            &self,
            _endpoint: &AgentEndpoint,
            _timeout: Duration,
        ) -> Result<AgentCard, TransportError> {
            self.card
                .clone()
                .ok_or_else(|| TransportError::Status {
                    status: 404,
                    message: "no card".to_string(),
                })
        }

        async fn dispatch(
            &self,
            _endpoint: &AgentEndpoint,
            envelope: &MeshEnvelope,
            _timeout: Duration,
        ) -> Result<String, TransportError> {
            self.dispatched.lock().unwrap().push(envelope.clone());
            self.dispatch_started.notify_one();
            let reply = self.reply.lock().unwrap().clone();
            match reply {
                Reply::Echo => Ok(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": envelope.correlation_id.as_str(),
                    "result": {
                        "role": "agent",
                        "parts": [{"kind": "text", "text": envelope.text()}],
                        "messageId": "reply-1",
                    },
                })
                .to_string()),
                Reply::Raw(body) => Ok(body),
                Reply::RemoteError(code, message) => Ok(serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": envelope.correlation_id.as_str(),
                    "error": {"code": code, "message": message},
                })
                .to_string()),
                Reply::Fail(e) => Err(e),
                Reply::Hang => std::future::pending().await,
                Reply::Panic => panic!("transport exploded"),
            }
        }
    }

    struct CapturingLogger {
        events: Mutex<Vec<serde_json::Value>>,
    }

    impl InteractionLogger for CapturingLogger {
        fn log(&self, event: InteractionEvent) {
            self.events.lock().unwrap().push(event.payload);
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap()
    }

    fn orchestrator(config: BridgeConfig, reply: Reply) -> (BridgeOrchestrator<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new(reply));
        (BridgeOrchestrator::new(&config, Arc::clone(&transport)), transport)
    }

    fn discover(endpoint: &str) -> ToolCall {
        ToolCall::new("a2a_discover").with_arg("endpoint", endpoint)
    }

    fn send(agent: &str, message: &str) -> ToolCall {
        ToolCall::new("a2a_send")
            .with_arg("agent_name", agent)
            .with_arg("message", message)
    }

    #[tokio::test]
    async fn test_discover_then_list() {
        let (bridge, _) = orchestrator(BridgeConfig::default(), Reply::Echo);

        let response = bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;
        assert_eq!(response.status, BridgeStatus::Ok);
        let data = response.data.unwrap();
        assert_eq!(data["name"], "elara");
        assert_eq!(data["trustZone"], "experimental");
        assert_eq!(data["status"], "created");

        let response = bridge.handle_at(ToolCall::new("a2a_list_agents"), "host", t0()).await;
        assert_eq!(response.status, BridgeStatus::Ok);
        assert_eq!(response.terminal_phase, BridgePhase::Completed);
        let agents = response.data.unwrap();
        let agents = agents.as_array().unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0]["name"], "elara");
        assert_eq!(agents[0]["trustZone"], "experimental");
        assert_eq!(agents[0]["capabilities"], serde_json::json!([]));
        assert_eq!(agents[0]["discoveredAt"], serde_json::json!(t0()));
        assert!(agents[0].get("lastSuccessAt").is_none());
        assert!(agents[0].get("authType").is_none());
    }

    #[tokio::test]
    async fn test_rediscovery_refreshes() {
        let (bridge, _) = orchestrator(BridgeConfig::default(), Reply::Echo);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;
        let response = bridge
            .handle_at(discover("https://elara.a2a.mesh/"), "host", t0())
            .await;

        assert_eq!(response.data.unwrap()["status"], "refreshed");
        assert_eq!(bridge.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_discover_uses_card_and_seeds() {
        let seeds = ZoneSeeds::new(vec![
            ZoneSeed::new("elara*", TrustZone::Trusted, Some(PersonalityMode::Formal)).unwrap(),
        ]);
        let config = BridgeConfig::default().with_zone_seeds(seeds);
        let transport = Arc::new(MockTransport::new(Reply::Echo).with_card(AgentCard {
            name: "Elara Prime".to_string(),
            capabilities: vec!["streaming".to_string()],
            auth_type: Some("bearer".to_string()),
        }));
        let bridge = BridgeOrchestrator::new(&config, transport);

        let response = bridge.handle_at(discover("https://node-7.a2a.mesh"), "host", t0()).await;
        let data = response.data.unwrap();
        assert_eq!(data["name"], "Elara Prime");
        assert_eq!(data["trustZone"], "trusted");
        assert_eq!(data["capabilities"], serde_json::json!(["streaming"]));
        assert_eq!(response.annotation.tone_hint, ToneHint::Formal);

        let record = bridge.registry().resolve("elara prime").unwrap();
        assert_eq!(record.auth_type.as_deref(), Some("bearer"));
    }

    #[tokio::test]
    async fn test_discover_rejects_bad_endpoint() {
        let (bridge, _) = orchestrator(BridgeConfig::default(), Reply::Echo);
        let response = bridge.handle_at(discover("not a url"), "host", t0()).await;
        assert_eq!(response.status, BridgeStatus::Failed);
        assert_eq!(response.reason.as_deref(), Some("validation-error"));
        assert!(bridge.registry().is_empty());
    }

    #[tokio::test]
    async fn test_send_to_fresh_agent() {
        let (bridge, transport) = orchestrator(BridgeConfig::default(), Reply::Echo);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let response = bridge.handle_at(send("Elara", "hello"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Ok);
        assert_eq!(response.data.as_ref().unwrap()["reply"], "hello");
        assert_eq!(response.annotation.tone_hint, ToneHint::Cautious);
        assert!(response.correlation_id.is_some());
        assert_eq!(response.terminal_phase, BridgePhase::Completed);
        assert_eq!(transport.dispatch_count(), 1);

        let record = bridge.registry().resolve("elara").unwrap();
        assert!(record.last_success_at.is_some());
        assert_eq!(record.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_send_to_unknown_agent_is_not_found() {
        let (bridge, transport) = orchestrator(BridgeConfig::default(), Reply::Echo);

        let response = bridge.handle_at(send("Ghost", "hello"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Failed);
        assert_eq!(response.reason.as_deref(), Some("not-found"));
        assert!(response.annotation.has_flag("unknown-agent"));
        assert_eq!(response.terminal_phase, BridgePhase::Failed);
        assert_eq!(transport.dispatch_count(), 0);
    }

    #[tokio::test]
    async fn test_blocked_agent_is_denied_without_dispatch() {
        let (bridge, transport) = orchestrator(BridgeConfig::default(), Reply::Echo);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;
        bridge.policy().set_zone("elara", TrustZone::Blocked).unwrap();

        let response = bridge.handle_at(send("elara", "hello"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Denied);
        assert_eq!(response.reason.as_deref(), Some("zone-blocked"));
        assert_eq!(response.annotation.tone_hint, ToneHint::Guarded);
        assert_eq!(response.terminal_phase, BridgePhase::Denied);
        assert_eq!(transport.dispatch_count(), 0);
        assert_eq!(bridge.registry().resolve("elara").unwrap().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_rate_limit_denies_after_quota() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(2, 60));
        let (bridge, transport) = orchestrator(config, Reply::Echo);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        for _ in 0..2 {
            let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;
            assert_eq!(response.status, BridgeStatus::Ok);
        }
        let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;
        assert_eq!(response.status, BridgeStatus::Denied);
        assert_eq!(response.reason.as_deref(), Some("rate-limited"));
        assert_eq!(transport.dispatch_count(), 2);

        let record = bridge.registry().resolve("elara").unwrap();
        assert_eq!(record.consecutive_failures, 0);
        assert!(record.last_failure_at.is_none());
    }

    #[tokio::test]
    async fn test_list_has_coarse_rate_limit() {
        let config =
            BridgeConfig::default().with_tool_rate_limit("a2a_list_agents", RateLimit::new(1, 60));
        let (bridge, _) = orchestrator(config, Reply::Echo);

        let first = bridge.handle_at(ToolCall::new("a2a_list_agents"), "host", t0()).await;
        let second = bridge.handle_at(ToolCall::new("a2a_list_agents"), "host", t0()).await;
        assert_eq!(first.status, BridgeStatus::Ok);
        assert_eq!(second.status, BridgeStatus::Denied);
        assert_eq!(second.reason.as_deref(), Some("rate-limited"));
    }

    #[tokio::test]
    async fn test_transport_failures_demote_then_block() {
        let config = BridgeConfig::default().with_trust_rules(TrustRules::new(3));
        let (bridge, transport) = orchestrator(
            config,
            Reply::Fail(TransportError::Connection("refused".to_string())),
        );
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        for i in 1..=3 {
            let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;
            assert_eq!(response.status, BridgeStatus::Failed);
            assert_eq!(response.reason.as_deref(), Some("transport-error"));
            assert!(response.correlation_id.is_some());
            assert_eq!(bridge.registry().resolve("elara").unwrap().consecutive_failures, i);
        }

        let record = bridge.registry().resolve("elara").unwrap();
        assert_eq!(record.trust_zone, TrustZone::Blocked);

        transport.set_reply(Reply::Echo);
        let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;
        assert_eq!(response.reason.as_deref(), Some("zone-blocked"));
        assert_eq!(transport.dispatch_count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_protocol_failure() {
        let (bridge, _) = orchestrator(BridgeConfig::default(), Reply::Raw("not json".to_string()));
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Failed);
        assert_eq!(response.reason.as_deref(), Some("protocol-error"));
        assert!(response.annotation.has_flag("recent-failures"));
        assert_eq!(bridge.registry().resolve("elara").unwrap().consecutive_failures, 1);
    }

    #[tokio::test]
    async fn test_remote_error_reply_is_protocol_failure() {
        let (bridge, _) = orchestrator(
            BridgeConfig::default(),
            Reply::RemoteError(-32000, "busy".to_string()),
        );
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Failed);
        assert_eq!(response.reason.as_deref(), Some("protocol-error"));
        assert!(response.error.unwrap().message.contains("busy"));
        assert_eq!(bridge.registry().resolve("elara").unwrap().consecutive_failures, 1);
    }

    #[tokio::test]
    async fn test_discover_rejects_non_http_endpoint() {
        let (bridge, transport) = orchestrator(BridgeConfig::default(), Reply::Echo);
        let response = bridge.handle_at(discover("ftp://elara.a2a.mesh"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Failed);
        assert_eq!(response.reason.as_deref(), Some("validation-error"));
        assert!(bridge.registry().is_empty());
        assert_eq!(transport.dispatch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_timeout_counts_as_failure() {
        let config = BridgeConfig::default().with_dispatch_timeout(Duration::from_secs(5));
        let (bridge, _) = orchestrator(config, Reply::Hang);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Failed);
        assert_eq!(response.reason.as_deref(), Some("timeout"));
        assert_eq!(bridge.registry().resolve("elara").unwrap().consecutive_failures, 1);
    }

    #[tokio::test]
    async fn test_cancelled_dispatch_still_records_failure() {
        let (bridge, transport) = orchestrator(BridgeConfig::default(), Reply::Hang);
        let bridge = Arc::new(bridge);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let task = {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move { bridge.handle_at(send("elara", "hi"), "host", t0()).await })
        };
        transport.dispatch_started.notified().await;
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        let record = bridge.registry().resolve("elara").unwrap();
        assert_eq!(record.consecutive_failures, 1);
        assert!(record.last_failure_at.is_some());
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let (bridge, _) = orchestrator(BridgeConfig::default(), Reply::Panic);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let response = bridge.handle_at(send("elara", "hi"), "host", t0()).await;

        assert_eq!(response.status, BridgeStatus::Failed);
        assert_eq!(response.reason.as_deref(), Some("internal-error"));
        assert_eq!(bridge.registry().resolve("elara").unwrap().consecutive_failures, 1);

        let again = bridge.handle_at(ToolCall::new("a2a_list_agents"), "host", t0()).await;
        assert_eq!(again.status, BridgeStatus::Ok);
    }

    #[tokio::test]
    async fn test_validation_and_unknown_tools() {
        let (bridge, transport) = orchestrator(BridgeConfig::default(), Reply::Echo);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let missing = bridge
            .handle_at(ToolCall::new("a2a_send").with_arg("agent_name", "elara"), "host", t0())
            .await;
        assert_eq!(missing.reason.as_deref(), Some("validation-error"));

        let empty = bridge.handle_at(send("elara", "  "), "host", t0()).await;
        assert_eq!(empty.reason.as_deref(), Some("validation-error"));

        let unknown = bridge.handle_at(ToolCall::new("a2a_stream"), "host", t0()).await;
        assert_eq!(unknown.reason.as_deref(), Some("unsupported-tool"));

        assert_eq!(transport.dispatch_count(), 0);
        assert_eq!(bridge.registry().resolve("elara").unwrap().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_concurrent_sends_respect_limit() {
        let config = BridgeConfig::default().with_tool_rate_limit("a2a_send", RateLimit::new(5, 60));
        let (bridge, transport) = orchestrator(config, Reply::Echo);
        bridge.handle_at(discover("https://elara.a2a.mesh"), "host", t0()).await;

        let calls = (0..20).map(|i| bridge.handle_at(send("elara", &format!("m{}", i)), "host", t0()));
        let responses = futures::future::join_all(calls).await;

        let ok = responses.iter().filter(|r| r.status == BridgeStatus::Ok).count();
        let denied = responses
            .iter()
            .filter(|r| r.reason.as_deref() == Some("rate-limited"))
            .count();
        assert_eq!(ok, 5);
        assert_eq!(denied, 15);
        assert_eq!(transport.dispatch_count(), 5);
    }

    #[tokio::test]
    async fn test_interaction_log_receives_one_event_per_call() {
        let logger = Arc::new(CapturingLogger {
            events: Mutex::new(Vec::new()),
        });
        let (bridge, _) = orchestrator(BridgeConfig::default(), Reply::Echo);
        let bridge = bridge.with_logger(logger.clone());

        bridge.handle_at(discover("https://elara.a2a.mesh"), "host-a", t0()).await;
        bridge.handle_at(send("elara", "hi"), "host-a", t0()).await;

        let events = logger.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["tool"], "a2a_send");
        assert_eq!(events[1]["caller"], "host-a");
        assert_eq!(events[1]["status"], "ok");
        assert_eq!(events[1]["terminalPhase"], "COMPLETED");
    }
}
