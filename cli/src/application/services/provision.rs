//! Provisioning: create Outline server instances and attach to existing ones.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{ComputeApi, ProgressReporter};
use crate::application::services::install_tracker::{
    InstallTracker, InstanceReadiness, shared_stage,
};
use crate::application::services::lifecycle::GcpServer;
use crate::application::services::operations::complete_operation;
use crate::domain::compute::{
    FirewallSpec, Instance, InstanceSpec, OUTLINE_LABEL, Operation, StaticIp,
};
use crate::domain::instance::validate_instance_name;
use crate::domain::{CloudError, InstanceLocator};

/// Ubuntu 22.04 LTS image family.
pub const SOURCE_IMAGE: &str = "projects/ubuntu-os-cloud/global/images/family/ubuntu-2204-lts";

/// Parameters for [`create_server`].
#[derive(Debug, Clone)]
pub struct CreateServerRequest {
    pub project_id: String,
    pub zone_id: String,
    pub name: String,
    pub machine_type: String,
    pub startup_script: String,
    pub poll_interval: Duration,
}

/// Instance launch parameters for an Outline server.
#[must_use]
pub fn outline_instance_spec(machine_type: &str, startup_script: &str) -> InstanceSpec {
    InstanceSpec {
        machine_type: machine_type.to_string(),
        source_image: SOURCE_IMAGE.to_string(),
        tags: vec![OUTLINE_LABEL.to_string()],
        labels: BTreeMap::from([(OUTLINE_LABEL.to_string(), "true".to_string())]),
        metadata: BTreeMap::from([
            ("enable-guest-attributes".to_string(), "TRUE".to_string()),
            ("startup-script".to_string(), startup_script.to_string()),
        ]),
        description: "Outline server".to_string(),
    }
}

/// Create an Outline server and return it with a fresh install tracker.
///
/// Returns once the instance insert has been accepted; creation itself and
/// static IP promotion continue lazily while the server's readiness is
/// awaited (by `wait_on_install` or `delete`).
///
/// # Errors
///
/// Returns an error if the name is invalid, the firewall rule cannot be
/// ensured, or the insert request is rejected.
pub async fn create_server<C: ComputeApi + 'static>(
    client: Rc<C>,
    request: &CreateServerRequest,
    reporter: &impl ProgressReporter,
) -> Result<GcpServer<C>> {
    validate_instance_name(&request.name)?;
    let locator = InstanceLocator::new(&request.project_id, &request.zone_id, &request.name);

    reporter.step("checking firewall rule...");
    ensure_firewall(client.as_ref(), &request.project_id)
        .await
        .context("failed to set up the outline firewall rule")?;

    reporter.step(&format!("creating instance {}...", request.name));
    let spec = outline_instance_spec(&request.machine_type, &request.startup_script);
    let operation = client
        .insert_instance(&locator, &spec)
        .await
        .with_context(|| format!("failed to create instance {}", request.name))?;
    let id = operation
        .target_id
        .clone()
        .with_context(|| format!("operation {} carries no instance id", operation.name))?;
    tracing::info!(instance = %request.name, id = %id, zone = %request.zone_id, "instance insert accepted");

    let readiness = instance_readiness(Rc::clone(&client), locator.clone(), operation);
    let tracker = InstallTracker::new(readiness, request.poll_interval);
    Ok(GcpServer::new(id, locator, client, tracker))
}

/// Readiness stages of a freshly inserted instance.
///
/// The static IP lookup starts together with the creation wait; promotion
/// runs only after creation succeeded and no static IP exists yet.
pub fn instance_readiness<C: ComputeApi + 'static>(
    client: Rc<C>,
    locator: InstanceLocator,
    insert: Operation,
) -> InstanceReadiness {
    let created = {
        let client = Rc::clone(&client);
        let project_id = locator.project_id.clone();
        shared_stage(async move {
            complete_operation(client.as_ref(), &project_id, insert)
                .await
                .map(|_| ())
        })
    };

    let ip_allocated = {
        let created = created.clone();
        shared_stage(async move {
            let lookup = find_static_ip(client.as_ref(), &locator);
            let (created, existing) = futures_util::join!(created, lookup);
            created?;
            if let Some(ip) = existing? {
                tracing::debug!(instance = %locator.instance_name, address = %ip.address, "static IP already reserved");
                return Ok(());
            }
            promote_static_ip(client.as_ref(), &locator).await
        })
    };

    InstanceReadiness::new(created, ip_allocated)
}

async fn find_static_ip(
    client: &impl ComputeApi,
    locator: &InstanceLocator,
) -> Result<Option<StaticIp>, CloudError> {
    match client
        .get_static_ip(&locator.region(), locator.static_ip_name())
        .await
    {
        Ok(ip) => Ok(Some(ip)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Promote the instance's address unless a static IP is already reserved
/// under its name. Used for servers attached after creation, whose
/// readiness never ran.
///
/// # Errors
///
/// See [`promote_static_ip`]; a failed lookup is returned as is.
pub async fn ensure_static_ip(
    client: &impl ComputeApi,
    locator: &InstanceLocator,
) -> Result<(), CloudError> {
    if find_static_ip(client, locator).await?.is_some() {
        return Ok(());
    }
    promote_static_ip(client, locator).await
}

/// Reserve the instance's ephemeral external address as a static IP.
///
/// # Errors
///
/// Returns [`CloudError::Decode`] if the instance has no external address,
/// [`CloudError::Operation`] if the reservation fails, or any API error.
pub async fn promote_static_ip(
    client: &impl ComputeApi,
    locator: &InstanceLocator,
) -> Result<(), CloudError> {
    let instance = client.get_instance(locator).await?;
    let address = instance.nat_ip().ok_or_else(|| {
        CloudError::Decode(format!(
            "instance {} has no external IP to promote",
            locator.instance_name
        ))
    })?;
    tracing::info!(instance = %locator.instance_name, address, "promoting ephemeral IP to static");
    let operation = client
        .insert_static_ip(&locator.region(), locator.static_ip_name(), address)
        .await?;
    complete_operation(client, &locator.project_id, operation).await?;
    Ok(())
}

/// Create the project-wide `outline` firewall rule unless it exists.
///
/// # Errors
///
/// Returns the first provider failure other than the rule being absent.
pub async fn ensure_firewall(client: &impl ComputeApi, project_id: &str) -> Result<(), CloudError> {
    let spec = FirewallSpec::outline();
    match client.get_firewall(project_id, &spec.name).await {
        Ok(_) => return Ok(()),
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }
    tracing::info!(project = project_id, firewall = %spec.name, "creating firewall rule");
    let operation = client.insert_firewall(project_id, &spec).await?;
    complete_operation(client, project_id, operation).await?;
    Ok(())
}

/// Wrap an existing instance; its readiness is already resolved.
#[must_use]
pub fn attach_server<C: ComputeApi>(
    client: Rc<C>,
    project_id: &str,
    instance: &Instance,
    poll_interval: Duration,
) -> GcpServer<C> {
    let locator = InstanceLocator::new(project_id, instance.zone_id(), &instance.name);
    let tracker = InstallTracker::new(InstanceReadiness::ready(), poll_interval);
    GcpServer::new(&instance.id, locator, client, tracker)
}

/// Every Outline server in the project, across zones.
///
/// # Errors
///
/// Returns the provider failure of the list call.
pub async fn list_servers<C: ComputeApi>(
    client: Rc<C>,
    project_id: &str,
    poll_interval: Duration,
) -> Result<Vec<GcpServer<C>>, CloudError> {
    let instances = client.list_instances(project_id, OUTLINE_LABEL).await?;
    Ok(instances
        .iter()
        .map(|instance| attach_server(Rc::clone(&client), project_id, instance, poll_interval))
        .collect())
}

/// The Outline server named `name`, if any.
///
/// # Errors
///
/// Returns the provider failure of the list call.
pub async fn find_server<C: ComputeApi>(
    client: Rc<C>,
    project_id: &str,
    name: &str,
    poll_interval: Duration,
) -> Result<Option<GcpServer<C>>, CloudError> {
    let servers = list_servers(client, project_id, poll_interval).await?;
    Ok(servers.into_iter().find(|server| server.name() == name))
}
