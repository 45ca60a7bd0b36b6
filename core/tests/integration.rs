//! Full CRUD lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every generated
//! action over real HTTP. The request function executes each
//! `RequestConfig` with ureq, turning the `params` extra option into a query
//! string, and returns status plus parsed body.

use rest_api_builder::template::encode_component;
use rest_api_builder::{ApiBuilder, ApiError, BuilderConfig, RequestConfig, RequestFn};
use serde_json::{json, Value};

#[derive(Debug)]
struct Response {
    status: u16,
    body: Value,
}

fn query_string(params: Option<&Value>) -> String {
    let Some(Value::Object(params)) = params else {
        return String::new();
    };
    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}={}", encode_component(key), encode_component(&value))
        })
        .collect();
    format!("?{}", pairs.join("&"))
}

/// Execute a `RequestConfig` using ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data.
fn execute(config: RequestConfig) -> Result<Response, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let query = query_string(config.get("params"));
    let url = format!("{}{query}", config.url().unwrap_or_default());
    let body = config
        .data()
        .map(serde_json::to_string)
        .transpose()
        .map_err(ApiError::transport)?;

    let mut response = match (config.method().unwrap_or_default(), body) {
        ("get", _) => agent.get(&url).call(),
        ("head", _) => agent.head(&url).call(),
        ("delete", _) => agent.delete(&url).call(),
        ("post", Some(body)) => agent
            .post(&url)
            .content_type("application/json")
            .send(body.as_bytes()),
        ("post", None) => agent.post(&url).send_empty(),
        ("put", Some(body)) => agent
            .put(&url)
            .content_type("application/json")
            .send(body.as_bytes()),
        ("put", None) => agent.put(&url).send_empty(),
        ("patch", Some(body)) => agent
            .patch(&url)
            .content_type("application/json")
            .send(body.as_bytes()),
        ("patch", None) => agent.patch(&url).send_empty(),
        (other, _) => return Err(ApiError::transport(format!("unsupported method: {other}"))),
    }
    .map_err(ApiError::transport)?;

    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().unwrap_or_default();
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok(Response { status, body })
}

#[test]
fn crud_lifecycle() {
    // Step 1: start mock server on a random port.
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    let settings = json!({"baseURL": format!("http://{addr}/")});
    let request_fn = RequestFn::from_sync(execute);
    let config = BuilderConfig::from_value(&settings, Some(request_fn)).unwrap();
    let builder = ApiBuilder::new(config).unwrap();
    let todos = builder
        .create_from_value(&json!({
            "path": "todos",
            "endpoints": [
                {"action": "list"},
                {"action": "create"},
                {"action": "retrieve"},
                {"action": "update"},
                {"action": "partialUpdate"},
                {"action": "destroy"},
                {"action": "exists", "method": "HEAD", "path": ":id"}
            ]
        }))
        .unwrap();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async {
        // Step 2: list is empty.
        let resp = todos.call("list", vec![]).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, json!([]));

        // Step 3: create.
        let resp = todos
            .call("create", vec![json!({"title": "Integration test", "done": false})])
            .await
            .unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body["title"], "Integration test");
        let id = resp.body["id"].as_str().unwrap().to_string();

        // Step 4: retrieve and probe.
        let resp = todos.call("retrieve", vec![json!(id)]).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["id"], json!(id));
        let resp = todos.call("exists", vec![json!(id)]).await.unwrap();
        assert_eq!(resp.status, 200);

        // Step 5: partial update.
        let resp = todos
            .call("partialUpdate", vec![json!(id), json!({"done": true})])
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["title"], "Integration test");
        assert_eq!(resp.body["done"], true);

        // Step 6: full update replaces the item.
        let resp = todos
            .call("update", vec![json!(id), json!({"title": "Updated"})])
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["title"], "Updated");
        assert!(resp.body.get("done").is_none());

        // Step 7: list with extra params becoming a query filter.
        let resp = todos
            .call("list", vec![json!({"params": {"title": "Updated"}})])
            .await
            .unwrap();
        assert_eq!(resp.body.as_array().unwrap().len(), 1);
        let resp = todos
            .call("list", vec![json!({"params": {"title": "other title"}})])
            .await
            .unwrap();
        assert!(resp.body.as_array().unwrap().is_empty());

        // Step 8: validation failures never reach the server.
        let err = todos.call("destroy", vec![]).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingIdentifier));

        // Step 9: destroy.
        let resp = todos.call("destroy", vec![json!(id)]).await.unwrap();
        assert_eq!(resp.status, 204);

        // Step 10: gone.
        let resp = todos.call("retrieve", vec![json!(id)]).await.unwrap();
        assert_eq!(resp.status, 404);
        let resp = todos.call("exists", vec![json!(id)]).await.unwrap();
        assert_eq!(resp.status, 404);
        let resp = todos.call("list", vec![]).await.unwrap();
        assert_eq!(resp.body, json!([]));
    });
}
