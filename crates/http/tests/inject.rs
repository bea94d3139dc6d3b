use async_trait::async_trait;
use hydra_dom::{create, ContentValue, DomArena, DomSerializer, ElementSink};
use hydra_http::{
    HttpClient, HttpDefaults, HttpError, Method, Parsed, Request, RequestOptions, Response,
    ResponseType, Result, Transport,
};
use std::sync::{Arc, Mutex};

/// Replies with a canned response and remembers what it was asked
struct Recorder {
    response: Response,
    seen: Mutex<Vec<Request>>,
}

impl Recorder {
    fn replying(response: Response) -> Arc<Self> {
        Arc::new(Self {
            response,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, request: &Request) -> Result<Response> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}

struct Offline;

#[async_trait]
impl Transport for Offline {
    async fn send(&self, _request: &Request) -> Result<Response> {
        Err(HttpError::Transport("connection refused".to_string()))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A document with `<div id="out">stale</div>` attached
fn page() -> (DomArena, u32) {
    let mut dom = DomArena::new();
    let out = create(&mut dom, "div[id=out]", &"stale".into(), None).unwrap();
    let root = dom.root_id();
    dom.append_child(root, out).unwrap();
    (dom, out)
}

fn inner(dom: &DomArena, node: u32) -> String {
    DomSerializer::new().inner_html(dom, node).unwrap()
}

#[tokio::test]
async fn test_text_body_injected_as_markup() {
    init_tracing();
    let transport = Recorder::replying(Response::new(200, "OK", "<em>fresh</em>"));
    let client = HttpClient::with_defaults(
        HttpDefaults::new("https://example.com").header("Accept", "text/html"),
        transport.clone(),
    );
    let (mut dom, out) = page();

    let completion = client
        .request(&mut dom, RequestOptions::get("/news").target("#out"))
        .await
        .unwrap();

    assert_eq!(completion.target, Some(out));
    assert_eq!(inner(&dom, out), "<em>fresh</em>");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].url, "https://example.com/news");
    assert_eq!(requests[0].header("accept"), Some("text/html"));
}

#[tokio::test]
async fn test_element_like_json_is_built() {
    init_tracing();
    let body = r#"{"tag": "ul.items", "content": [{"tag": "li", "content": "a"}, {"tag": "li", "content": "b"}]}"#;
    let transport = Recorder::replying(Response::new(200, "OK", body).with_type(ResponseType::Json));
    let client = HttpClient::new(transport);
    let (mut dom, out) = page();

    client
        .request(&mut dom, RequestOptions::get("/list").target(out))
        .await
        .unwrap();

    assert_eq!(inner(&dom, out), r#"<ul class="items"><li>a</li><li>b</li></ul>"#);
    assert!(dom.query_selector("ul.items").unwrap().is_some());
}

#[tokio::test]
async fn test_element_like_json_with_structured_attribute() {
    let body = r#"{"tag": "div.card", "content": "hi", "attributes": {"data-cfg": {"opts": {"a": 1}}}}"#;
    let client = HttpClient::new(Recorder::replying(Response::new(200, "OK", body)));
    let (mut dom, out) = page();

    client
        .request(&mut dom, RequestOptions::get("/card").target(out))
        .await
        .unwrap();

    let card = dom.query_selector("div.card").unwrap().unwrap();
    assert_eq!(dom.get(card).unwrap().attr("data-cfg"), Some(r#"{"opts":{"a":1}}"#));
    assert_eq!(dom.text_content(card).unwrap(), "hi");
}

#[tokio::test]
async fn test_error_json_body_rendered_in_full() {
    let body = r#"{"err": {"content": "x", "code": 42}}"#;
    let client = HttpClient::new(Recorder::replying(Response::new(422, "Unprocessable Entity", body)));
    let (mut dom, out) = page();

    client
        .request(&mut dom, RequestOptions::get("/bad").target(out))
        .await
        .unwrap();

    assert_eq!(
        dom.text_content(out).unwrap(),
        r#"ERROR: HTTP Unprocessable Entity: {"err":{"content":"x","code":42}}"#
    );
}

#[tokio::test]
async fn test_plain_json_rendered_as_text() {
    let client = HttpClient::new(Recorder::replying(Response::new(200, "OK", r#"{"count": 3}"#)));
    let (mut dom, out) = page();

    client
        .request(&mut dom, RequestOptions::get("/stats").target(out))
        .await
        .unwrap();

    assert_eq!(dom.text_content(out).unwrap(), r#"{"count":3}"#);
}

#[tokio::test]
async fn test_error_status_writes_message_and_runs_callbacks() {
    init_tracing();
    let client = HttpClient::new(Recorder::replying(Response::new(404, "Not Found", "missing")));
    let (mut dom, out) = page();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let (on_success, on_error, on_done) = (calls.clone(), calls.clone(), calls.clone());
    let options = RequestOptions::get("/gone")
        .target("div[id=out]")
        .on_success(move |_, _| on_success.lock().unwrap().push("success"))
        .on_error(move |parsed, response| {
            assert_eq!(parsed, &Parsed::Text("missing".to_string()));
            assert_eq!(response.status, 404);
            on_error.lock().unwrap().push("error");
        })
        .on_done(move |_, _| on_done.lock().unwrap().push("done"));

    let completion = client.request(&mut dom, options).await.unwrap();

    assert_eq!(completion.status, 404);
    assert_eq!(dom.text_content(out).unwrap(), "ERROR: HTTP Not Found: missing");
    assert_eq!(*calls.lock().unwrap(), vec!["error", "done"]);
}

#[tokio::test]
async fn test_success_callback_order() {
    let client = HttpClient::new(Recorder::replying(Response::new(201, "Created", "ok")));
    let mut dom = DomArena::new();
    let calls = Arc::new(Mutex::new(Vec::new()));

    let (on_success, on_done) = (calls.clone(), calls.clone());
    let options = RequestOptions::post("/things")
        .on_success(move |_, _| on_success.lock().unwrap().push("success"))
        .on_done(move |_, _| on_done.lock().unwrap().push("done"));

    client.request(&mut dom, options).await.unwrap();
    assert_eq!(*calls.lock().unwrap(), vec!["success", "done"]);
}

#[tokio::test]
async fn test_custom_parser_sees_default_parse() {
    let client = HttpClient::new(Recorder::replying(Response::new(200, "OK", r#""hello""#)));
    let (mut dom, out) = page();

    let options = RequestOptions::get("/greeting")
        .target(out)
        .parser(|_response, default| match default {
            Parsed::Json(value) => Parsed::Text(format!("<b>{}</b>", value.as_str().unwrap_or(""))),
            other => other,
        });

    client.request(&mut dom, options).await.unwrap();
    assert_eq!(inner(&dom, out), "<b>hello</b>");
}

#[tokio::test]
async fn test_validation_happens_before_sending() {
    let transport = Recorder::replying(Response::new(200, "OK", ""));
    let client = HttpClient::new(transport.clone());
    let mut dom = DomArena::new();

    let err = client
        .request(&mut dom, RequestOptions::new("connect", "/x"))
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::UnsupportedMethod(m) if m == "connect"));

    let err = client
        .request(&mut dom, RequestOptions::new("get", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::MissingUrl));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_transport_failure_leaves_target_untouched() {
    let client = HttpClient::new(Offline);
    let (mut dom, out) = page();

    let err = client
        .request(&mut dom, RequestOptions::get("/x").target(out))
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Transport(_)));
    assert_eq!(dom.text_content(out).unwrap(), "stale");
}

#[tokio::test]
async fn test_thunk_content_and_http_share_renderer() {
    let (mut dom, out) = page();
    hydra_http::inject_text(&mut dom, out, &ContentValue::thunk(|| true.into())).unwrap();
    assert_eq!(dom.text_content(out).unwrap(), "true");
}
