//! Given steps for connection lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use notiflink::connection::services::CreateConnectionRequest;
use rstest_bdd_macros::given;

#[given(r#"a webview server "{name}" with status "{status}""#)]
fn webview_server(
    world: &mut LifecycleWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let servers = &world.registry.webview_servers;
    let created = run_async(servers.create(&name)).wrap_err("create webview server")?;
    let server =
        run_async(servers.set_status(created.id(), &status)).wrap_err("set webview status")?;
    world.webview_servers.insert(name, server);
    Ok(())
}

#[given(r#"a user delivery server "{name}" with status "{status}""#)]
fn user_delivery_server(
    world: &mut LifecycleWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let servers = &world.registry.user_delivery_servers;
    let created = run_async(servers.create(&name)).wrap_err("create user delivery server")?;
    let server = run_async(servers.set_status(created.id(), &status))
        .wrap_err("set user delivery status")?;
    world.user_delivery_servers.insert(name, server);
    Ok(())
}

#[given(r#"a connection between "{webview}" and "{user_delivery}" with status "{status}""#)]
fn connection(
    world: &mut LifecycleWorld,
    webview: String,
    user_delivery: String,
    status: String,
) -> Result<(), eyre::Report> {
    let user_delivery_id = world.user_delivery(&user_delivery)?.id();
    let webview_id = world.webview(&webview)?.id();
    let request = CreateConnectionRequest::new(user_delivery_id.to_string())
        .with_webview_server_id(webview_id.to_string());
    let connections = &world.registry.connections;
    let created = run_async(connections.create(request)).wrap_err("create connection")?;
    let stored = run_async(connections.set_status(created.id(), &status))
        .wrap_err("set connection status")?;
    world.connections.insert((webview, user_delivery), stored);
    Ok(())
}
