//! Runs an actix-web app on its own thread so tests on any runtime can
//! talk to it.

use std::net::SocketAddr;

use actix_web::{App, HttpServer, dev::ServerHandle, web};
use url::Url;

pub(crate) struct Running {
    addr: SocketAddr,
    handle: ServerHandle,
}

impl Running {
    pub(crate) fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("server address is a valid URL")
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        // the stop command is sent eagerly, the returned future only waits for it
        drop(self.handle.stop(false));
    }
}

pub(crate) fn spawn<F>(
    name: &str,
    configure: F,
) -> Running
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static, {
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            actix_web::rt::System::new().block_on(async move {
                let server = HttpServer::new(move || App::new().configure(configure.clone()))
                    .workers(1)
                    .disable_signals()
                    .bind(("127.0.0.1", 0))
                    .expect("bind test server");

                let addr = server.addrs()[0];
                let server = server.run();

                tx.send((addr, server.handle()))
                    .expect("report test server address");

                let _ = server.await;
            })
        })
        .expect("spawn test server thread");

    let (addr, handle) = rx.recv().expect("test server started");
    tracing::debug!(%addr, name, "test server listening");

    Running { addr, handle }
}
