use deploy_defs::{DeploySpec, Plan, StackKind};

use crate::stacks::stack_variables;

// Variables every generated root module declares regardless of the
// selected stacks; the provider block depends on them.
const BASE_VARIABLES: &[(&str, &str)] = &[("app_name", "string"), ("region", "string")];

pub(crate) fn render_main_tf(stacks: &[StackKind]) -> String {
    let mut out = String::new();

    out.push_str(
        r#"terraform {
  required_version = ">= 1.5"

  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
  }
}

provider "aws" {
  region = var.region
}
"#,
    );

    let has_database = stacks.contains(&StackKind::Database);

    for stack in stacks {
        out.push('\n');
        out.push_str(&render_module_block(*stack, has_database));
    }

    out
}

fn render_module_block(stack: StackKind, has_database: bool) -> String {
    let mut lines = vec![format!("  source = \"./modules/{}\"", stack.dir_name())];

    for (name, _) in stack_variables(stack) {
        if *name == "environment" {
            continue;
        }
        lines.push(format!("  {} = var.{}", name, name));
    }

    let is_runtime_stack =
        matches!(stack, StackKind::ContainerService | StackKind::ContainerCluster);
    if is_runtime_stack {
        if has_database {
            // The database address flows into the runtime's environment map
            lines.push(
                [
                    "  environment = merge(var.environment, {",
                    "    DATABASE_HOST = module.database.address",
                    "    DATABASE_NAME = var.db_name",
                    "    DATABASE_USER = var.db_username",
                    "  })",
                ]
                .join("\n"),
            );
        } else {
            lines.push("  environment = var.environment".to_string());
        }
    }

    format!(
        "module \"{}\" {{\n{}\n}}\n",
        stack.module_name(),
        lines.join("\n")
    )
}

pub(crate) fn render_variables_tf(stacks: &[StackKind]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    let mut out = String::new();

    let all = BASE_VARIABLES
        .iter()
        .chain(stacks.iter().flat_map(|s| stack_variables(*s).iter()));

    for (name, tf_type) in all {
        if seen.contains(name) {
            continue;
        }
        seen.push(*name);
        out.push_str(&format!(
            "variable \"{}\" {{\n  type = {}\n}}\n\n",
            name, tf_type
        ));
    }

    out.trim_end().to_string() + "\n"
}

pub(crate) fn render_backend_tf(
    app_name: &str,
    region: &str,
    bucket: &str,
    lock_table: &str,
) -> String {
    format!(
        r#"terraform {{
  backend "s3" {{
    bucket         = "{}"
    key            = "{}/terraform.tfstate"
    region         = "{}"
    dynamodb_table = "{}"
    encrypt        = true
  }}
}}
"#,
        bucket, app_name, region, lock_table
    )
}

pub(crate) fn render_outputs_tf(stacks: &[StackKind]) -> String {
    let mut out = String::new();

    for stack in stacks {
        match stack {
            StackKind::ContainerService => {
                out.push_str(&render_output("service_url", "container_service", "service_url"));
            }
            StackKind::ContainerCluster => {
                out.push_str(&render_output("service_url", "container_cluster", "service_url"));
                out.push_str(&render_output(
                    "load_balancer_dns",
                    "container_cluster",
                    "load_balancer_dns",
                ));
            }
            StackKind::StaticSite => {
                out.push_str(&render_output("cdn_domain", "static_site", "cdn_domain"));
            }
            _ => {}
        }
    }

    out
}

fn render_output(name: &str, module: &str, attribute: &str) -> String {
    format!(
        "output \"{}\" {{\n  value = module.{}.{}\n}}\n\n",
        name, module, attribute
    )
}

pub(crate) fn render_summary(spec: &DeploySpec, plan: &Plan, stacks: &[StackKind]) -> String {
    let mut out = format!(
        "# Deployment summary: {}\n\nRuntime: {}\nRegion: {}\n",
        spec.app_name,
        plan.runtime.as_str(),
        spec.region.as_str()
    );
    if let Some(db) = plan.db {
        out.push_str(&format!("Database: {}\n", db.as_str()));
    }
    if let Some(front) = plan.front {
        out.push_str(&format!("Front tier: {}\n", front.as_str()));
    }
    if let Some(host) = &plan.network.host {
        out.push_str(&format!("Domain: {} (tls: {})\n", host, plan.network.tls));
    }
    out.push_str("\nStacks:\n");
    for stack in stacks {
        out.push_str(&format!("- {}\n", stack.dir_name()));
    }
    out
}
