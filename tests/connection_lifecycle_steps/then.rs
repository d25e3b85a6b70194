//! Then steps for connection lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use notiflink::envelope::Classify;
use rstest_bdd_macros::then;

#[then("the request succeeds")]
fn request_succeeds(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got: {err}")),
        None => Err(eyre::eyre!("missing request result in scenario world")),
    }
}

#[then("the request is refused with code {code:u16}")]
fn request_refused(world: &LifecycleWorld, code: u16) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result in scenario world"))?;
    let Err(err) = result else {
        return Err(eyre::eyre!("expected refusal with code {code}, got success"));
    };
    let actual = err.classify().code();
    if actual != code {
        return Err(eyre::eyre!("expected code {code}, got {actual}: {err}"));
    }
    Ok(())
}

#[then(r#"the connection between "{webview}" and "{user_delivery}" has status "{status}""#)]
fn connection_has_status(
    world: &LifecycleWorld,
    webview: String,
    user_delivery: String,
    status: String,
) -> Result<(), eyre::Report> {
    let id = world.connection(&webview, &user_delivery)?.id();
    let stored = run_async(world.registry.connections.get(id)).wrap_err("get connection")?;
    if stored.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected status {status}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then(r#"{count:usize} connections of webview server "{name}" have status "{status}""#)]
fn connections_of_webview_have_status(
    world: &LifecycleWorld,
    count: usize,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let webview_id = world.webview(&name)?.id();
    let mut matching = 0;
    for connection in world.connections.values() {
        if connection.webview_server_id() != webview_id {
            continue;
        }
        let stored = run_async(world.registry.connections.get(connection.id()))
            .wrap_err("get connection")?;
        if stored.status().as_str() == status {
            matching += 1;
        }
    }
    if matching != count {
        return Err(eyre::eyre!(
            "expected {count} {status} connections of '{name}', found {matching}"
        ));
    }
    Ok(())
}
