use std::time::Duration;

use log::debug;
use paho_mqtt::{self as mqtt, SslOptions};

pub async fn connect_mqtt(
    address: String,
    username: String,
    password: String,
    client_id: &str,
) -> Result<mqtt::AsyncClient, mqtt::Error> {
    let secure = address.starts_with("ssl://") || address.starts_with("mqtts://");

    let create_opts = mqtt::CreateOptionsBuilder::new_v3()
        .server_uri(address)
        .client_id(client_id)
        .finalize();

    let client = mqtt::AsyncClient::new(create_opts)?;

    let mut conn_opts = mqtt::ConnectOptionsBuilder::new_v3();
    conn_opts
        .keep_alive_interval(Duration::from_secs(30))
        .clean_session(false)
        .user_name(username)
        .password(password);

    if secure {
        conn_opts.ssl_options(SslOptions::new());
    }

    debug!("connecting as {client_id}, tls: {secure}");
    client.connect(conn_opts.finalize()).await?;

    Ok(client)
}
