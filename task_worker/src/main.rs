#[cfg(target_arch = "wasm32")]
mod op {
    use js_sys::Uint8Array;
    use wasm_bindgen::{prelude::*, JsCast};
    use web_sys::{DedicatedWorkerGlobalScope, MessageEvent};

    use task_worker::handle_message;

    pub fn main() {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();

        let worker_scope: DedicatedWorkerGlobalScope =
            js_sys::eval("self").expect_throw("cant get self").unchecked_into();

        let handler = {
            let worker_scope = worker_scope.clone();

            Closure::wrap(Box::new(move |event: MessageEvent| {
                let data: Uint8Array = event.data().unchecked_into();
                // an error here surfaces on the caller side as the worker's error event
                let data: Vec<u8> = handle_message(data.to_vec()).expect_throw("can't encode response");
                let result = Uint8Array::from(data.as_slice());

                worker_scope.post_message(&result).expect_throw("can't send message");
            }) as Box<dyn FnMut(_)>)
        };

        worker_scope.set_onmessage(Some(handler.as_ref().unchecked_ref()));

        handler.forget();
    }
}

/// Native counterpart: reads one JSON request from stdin and writes one JSON
/// response to stdout, so the worker can also be driven as a child process.
#[cfg(not(target_arch = "wasm32"))]
mod op {
    use std::io::{self, Read, Write};

    use engine::WorkRequest;
    use task_worker::handle_request;

    pub fn main() {
        if let Err(err) = run() {
            eprintln!("task_worker: {}", err);
            std::process::exit(1);
        }
    }

    fn run() -> io::Result<()> {
        let mut raw = Vec::new();
        io::stdin().read_to_end(&mut raw)?;
        let request: WorkRequest = serde_json::from_slice(&raw).map_err(io::Error::from)?;

        let response = handle_request(request);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, &response).map_err(io::Error::from)?;
        out.write_all(b"\n")
    }
}

fn main() {
    op::main();
}
