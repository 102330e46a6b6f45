use fan_control::Coordinator;
use presk::{listen, publish_fan, publisher, router, serve, Config, Result, Session};
use transport::connect_mqtt;

use log::{error, info};
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_timed();

    info!("presk version {VERSION}");

    let config = Config::from_env()?;
    info!("fan levels {:?}", config.zones.levels());

    let mqtt_client = connect_mqtt(
        config.mqtt_address,
        config.mqtt_user,
        config.mqtt_pass,
        &config.mqtt_client_id,
    )
    .await?;
    info!("connected mqtt");

    let (publisher, states) = publisher();
    let (session, handle) = Session::new(Coordinator::new(config.zones.clone(), publisher));

    let http_listener = TcpListener::bind(config.http_address).await?;

    let publish_handle = task::spawn(publish_fan(mqtt_client.clone(), states));
    let mut listen_handle = task::spawn(listen(mqtt_client.clone(), handle.clone()));
    let web_handle = task::spawn(serve(http_listener, router(handle, config.zones)));

    let coordinator = session
        .run(async {
            tokio::select! {
                result = shutdown() => if let Err(err) = result {
                    error!("Error waiting for shutdown signal: {err}");
                },
                result = &mut listen_handle => match result {
                    Ok(Ok(())) => info!("listener stopped, exiting..."),
                    Ok(Err(err)) => error!("Error listening mqtt: {err}"),
                    Err(err) => error!("Error joining listener: {err}"),
                },
            }
        })
        .await;

    // dropping the listener drops its subscription
    if !listen_handle.is_finished() {
        listen_handle.abort();
        let _ = listen_handle.await;
    }
    web_handle.abort();

    // the publisher drains once the last sender is gone
    drop(coordinator);
    publish_handle.await?;

    mqtt_client.disconnect(None).await?;
    info!("disconnected mqtt");

    Ok(())
}

async fn shutdown() -> Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = terminate.recv() => info!("got SIGTERM, exiting..."),
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("got ctrl-c, exiting...");
        }
    };

    Ok(())
}
