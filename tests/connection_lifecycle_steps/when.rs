//! When steps for connection lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use notiflink::connection::services::CreateConnectionRequest;
use rstest_bdd_macros::when;

#[when(r#"the webview server "{name}" is set to "{status}""#)]
fn set_webview_status(
    world: &mut LifecycleWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let id = world.webview(&name)?.id();
    let server = run_async(world.registry.webview_servers.set_status(id, &status))
        .wrap_err_with(|| format!("set webview server '{name}' to {status}"))?;
    world.webview_servers.insert(name, server);
    Ok(())
}

#[when(r#"the user delivery server "{name}" is set to "{status}""#)]
fn set_user_delivery_status(
    world: &mut LifecycleWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let id = world.user_delivery(&name)?.id();
    let server = run_async(world.registry.user_delivery_servers.set_status(id, &status))
        .wrap_err_with(|| format!("set user delivery server '{name}' to {status}"))?;
    world.user_delivery_servers.insert(name, server);
    Ok(())
}

#[when(r#"the connection between "{webview}" and "{user_delivery}" is set to "{status}""#)]
fn set_connection_status(
    world: &mut LifecycleWorld,
    webview: String,
    user_delivery: String,
    status: String,
) -> Result<(), eyre::Report> {
    let id = world.connection(&webview, &user_delivery)?.id();
    world.last_result = Some(run_async(world.registry.connections.set_status(id, &status)));
    Ok(())
}

#[when(r#"another connection between "{webview}" and "{user_delivery}" is requested"#)]
fn request_another_connection(
    world: &mut LifecycleWorld,
    webview: String,
    user_delivery: String,
) -> Result<(), eyre::Report> {
    let user_delivery_id = world.user_delivery(&user_delivery)?.id();
    let webview_id = world.webview(&webview)?.id();
    let request = CreateConnectionRequest::new(user_delivery_id.to_string())
        .with_webview_server_id(webview_id.to_string());
    world.last_result = Some(run_async(world.registry.connections.create(request)));
    Ok(())
}
