#![allow(dead_code)]

pub mod requests {
    use autojson::Request;

    pub fn get(uri: &str) -> Request {
        http::Request::builder()
            .method("GET")
            .uri(uri)
            .body(Vec::new())
            .unwrap()
    }
}

pub mod test_server {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::sync::Once;
    use std::time::Duration;

    use autojson::server::{HttpServer, JsonService, ServerHandle};

    /// Ensures May coroutines are configured only once
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }

    /// Start `service` on a free local port and wait until it accepts connections.
    pub fn start(service: JsonService) -> ServerHandle {
        setup_may_runtime();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let handle = HttpServer(service).start(addr).unwrap();
        handle.wait_ready().unwrap();
        handle
    }

    pub fn send_request(addr: &SocketAddr, req: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(req.as_bytes()).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(200)))
            .unwrap();
        let mut buf = Vec::new();
        loop {
            let mut tmp = [0u8; 1024];
            match stream.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break
                }
                Err(e) => panic!("read error: {:?}", e),
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Status code, lowercased header lines and raw body of an HTTP/1.1 response.
    pub fn parse_response(resp: &str) -> (u16, Vec<String>, String) {
        let mut parts = resp.splitn(2, "\r\n\r\n");
        let head = parts.next().unwrap_or("");
        let body = parts.next().unwrap_or("").to_string();
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("0")
            .parse()
            .unwrap();
        let headers = lines.map(str::to_lowercase).collect();
        (status, headers, body)
    }
}
