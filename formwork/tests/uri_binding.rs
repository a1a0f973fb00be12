use formwork::binding::{self, Bind as _, FieldAux, Namespace, ValueSource};
use formwork::request::body::BufferedBody;
use formwork::request::RequestHead;
use http::Method;

#[derive(Default, formwork::Bind)]
struct ShowPost {
    #[bind(param = "post_id")]
    post_id: u64,
    #[bind(param = "slug", form = "slug")]
    slug: String,
}

#[test]
fn route_placeholders_bind_under_the_param_namespace() {
    let mut dest = ShowPost::default();
    binding::bind_params([("post_id", "42"), ("slug", "hello-world")], &mut dest).unwrap();
    assert_eq!(dest.post_id, 42);
    assert_eq!(dest.slug, "hello-world");
}

#[test]
fn namespaces_are_independent() {
    let source = ValueSource::from_pairs([("post_id", "42"), ("slug", "from-form")]);
    let mut dest = ShowPost::default();
    dest.bind(&source, Namespace::Form).unwrap();
    // `post_id` is only annotated under `param`, so the form pass skips it.
    assert_eq!(dest.post_id, 0);
    assert_eq!(dest.slug, "from-form");
}

#[test]
fn suppressed_and_empty_keys_are_left_out_of_the_field_table() {
    #[derive(Default, formwork::Bind)]
    struct Partial {
        #[bind(form = "kept")]
        kept: String,
        #[bind(form = "-")]
        suppressed: String,
        #[bind(form = "   ")]
        blank: String,
        #[bind(form = "  padded  ")]
        padded: String,
    }

    let bindings = Partial::bindings(Namespace::Form);
    let keys: Vec<_> = bindings.iter().map(|b| b.key).collect();
    assert_eq!(keys, ["kept", "padded"]);

    let source = ValueSource::from_pairs([
        ("kept", "yes"),
        ("-", "no"),
        ("padded", "trimmed"),
    ]);
    let mut partial = Partial::default();
    partial.bind(&source, Namespace::Form).unwrap();
    assert_eq!(partial.kept, "yes");
    assert_eq!(partial.suppressed, "");
    assert_eq!(partial.blank, "");
    assert_eq!(partial.padded, "trimmed");
}

#[test]
fn date_format_annotations_reach_the_field_table() {
    #[derive(Default, formwork::Bind)]
    struct Event {
        #[bind(form = "starts_at", date_format = "%d/%m/%Y")]
        starts_at: Option<jiff::civil::DateTime>,
    }

    assert_eq!(
        Event::bindings(Namespace::Form),
        &[binding::FieldBinding {
            field: "starts_at",
            key: "starts_at",
            aux: FieldAux {
                date_format: Some("%d/%m/%Y")
            },
        }]
    );

    let source = ValueSource::from_pairs([("starts_at", "01/03/2024")]);
    let mut event = Event::default();
    event.bind(&source, Namespace::Form).unwrap();
    assert_eq!(
        event.starts_at,
        Some(jiff::civil::date(2024, 3, 1).at(0, 0, 0, 0))
    );
}

#[test]
fn later_passes_only_touch_the_keys_they_resolve() {
    #[derive(Default, formwork::Bind)]
    struct Toggle {
        #[bind(param = "name", form = "name")]
        name: String,
        #[bind(param = "enabled", form = "enabled")]
        enabled: bool,
    }

    let mut toggle = Toggle::default();
    binding::bind_params([("name", "cache"), ("enabled", "true")], &mut toggle).unwrap();
    assert!(toggle.enabled);

    // The second pass resolves only `enabled`; `name` keeps its value. An
    // explicitly submitted `false` overwrites the earlier `true`: a present
    // zero value is a value, not an absence.
    let source = ValueSource::from_pairs([("enabled", "false")]);
    toggle.bind(&source, Namespace::Form).unwrap();
    assert_eq!(toggle.name, "cache");
    assert!(!toggle.enabled);
}

#[tokio::test]
async fn structured_bodies_decode_first_then_form_data_overlays() {
    #[derive(Default, serde::Deserialize, formwork::Bind)]
    #[serde(default)]
    struct CreateUser {
        name: String,
        age: u8,
        #[bind(form = "role")]
        role: String,
    }

    let mut headers = http::HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        "application/json".parse().unwrap(),
    );
    let head = RequestHead {
        method: Method::POST,
        target: "/users?role=admin".parse().unwrap(),
        version: http::Version::HTTP_11,
        headers,
    };
    let body = BufferedBody::from(&br#"{"name":"wardonne","age":10}"#[..]);

    let mut user = CreateUser::default();
    binding::bind(&head, &body, &mut user).await.unwrap();

    assert_eq!(user.name, "wardonne");
    assert_eq!(user.age, 10);
    // The query string contributed the `role` scalar on top of the JSON body.
    assert_eq!(user.role, "admin");
}
