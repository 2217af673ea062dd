//! Turns a deployment intent plus detected repository shape into an
//! infrastructure plan. Decisions are deterministic and free of I/O; invalid
//! combinations are surfaced by `validate_plan`, never by panicking.

use deploy_defs::{DbKind, DeploySpec, HintLevel, NetworkPlan, Plan, RepoFacts, Runtime};

/// Decides the runtime family, database and front tier for one deployment.
///
/// Rules are evaluated in a fixed precedence order: database requirement,
/// app partition, base runtime selection, monorepo front override, cost
/// downgrade, perf upgrade, network settings. Later rules only refine the
/// outcome of earlier ones.
pub fn create_plan(spec: &DeploySpec, facts: &RepoFacts) -> Plan {
    let needs_db = facts.apps.iter().any(|a| a.needs_db) || spec.data.db.is_some();
    let db = if needs_db {
        Some(spec.data.db.unwrap_or(DbKind::Postgres))
    } else {
        None
    };

    let static_count = facts.apps.iter().filter(|a| a.is_static()).count();
    let http_count = facts.apps.iter().filter(|a| a.is_http()).count();
    let background_count = facts.apps.iter().filter(|a| a.is_background()).count();

    let mut runtime = if static_count > 0 && http_count == 0 && background_count == 0 {
        Runtime::StaticCdnBucket
    } else if http_count == 1 && background_count == 0 && !facts.monorepo {
        Runtime::ManagedContainerService
    } else {
        Runtime::OrchestratedContainerCluster
    };

    let mut front = None;
    if facts.monorepo && static_count > 0 {
        front = Some(Runtime::StaticCdnBucket);
        if http_count > 0 {
            // Serving a static front next to http services needs a shared
            // ingress layer for routing
            runtime = Runtime::OrchestratedContainerCluster;
        }
    }

    // The cheaper single-service option only applies when complexity is
    // otherwise minimal
    if spec.hints.cost == HintLevel::Low
        && runtime == Runtime::OrchestratedContainerCluster
        && http_count == 1
        && background_count == 0
    {
        runtime = Runtime::ManagedContainerService;
    }

    // Evaluated after the cost rule; see DESIGN.md on conflicting hints
    if spec.hints.perf == HintLevel::High && runtime == Runtime::ManagedContainerService {
        runtime = Runtime::OrchestratedContainerCluster;
    }

    Plan {
        runtime,
        db,
        front,
        network: NetworkPlan {
            tls: true,
            host: spec.domain.clone(),
        },
    }
}

/// Checks a plan against the spec and repository it was derived from.
/// An empty result means valid; each violation is a distinct message. A
/// non-empty result must abort the pipeline before any IaC is generated.
pub fn validate_plan(plan: &Plan, spec: &DeploySpec, facts: &RepoFacts) -> Vec<String> {
    let mut violations = Vec::new();

    let http_count = facts.apps.iter().filter(|a| a.is_http()).count();

    if plan.runtime == Runtime::StaticCdnBucket && http_count > 0 {
        violations.push(
            "static-cdn-bucket runtime cannot serve http apps, a container runtime is required"
                .to_string(),
        );
    }

    if plan.runtime == Runtime::ManagedContainerService && http_count > 1 {
        violations.push(format!(
            "managed-container-service supports exactly one http app, repository has {}",
            http_count
        ));
    }

    if plan.db.is_some() && !facts.apps.iter().any(|a| a.needs_db) && spec.data.db.is_none() {
        violations.push(
            "plan provisions a database but no app requires one and none was requested"
                .to_string(),
        );
    }

    violations
}
