use formwork::binding::{
    self, BindError, BindRequestError, Namespace, UploadedFile, UploadedFileCollection,
    ValueSource,
};
use formwork::binding::Bind as _;
use formwork::request::body::BufferedBody;
use formwork::request::RequestHead;
use http::Method;

fn post(target: &str, content_type: &str) -> RequestHead {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONTENT_TYPE, content_type.parse().unwrap());
    RequestHead {
        method: Method::POST,
        target: target.parse().unwrap(),
        version: http::Version::HTTP_11,
        headers,
    }
}

fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> BufferedBody {
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    BufferedBody::from(body.into_bytes())
}

#[derive(Default, formwork::Bind)]
struct Registration {
    #[bind(form = "name")]
    name: String,
    #[bind(form = "address")]
    address: String,
    #[bind(form = "age")]
    age: i32,
    #[bind(form = "valid")]
    valid: bool,
    #[bind(form = "tags")]
    tags: Vec<String>,
}

#[tokio::test]
async fn urlencoded_scalars_fill_every_annotated_field() {
    let head = post("/register", "application/x-www-form-urlencoded");
    let body = BufferedBody::from(
        &b"name=wardonne&address=shanghai&age=10&valid=true&tags=a&tags=b"[..],
    );

    let mut registration = Registration::default();
    binding::bind_form(&head, &body, &mut registration)
        .await
        .unwrap();

    assert_eq!(registration.name, "wardonne");
    assert_eq!(registration.address, "shanghai");
    assert_eq!(registration.age, 10);
    assert!(registration.valid);
    assert_eq!(registration.tags, ["a", "b"]);
}

#[tokio::test]
async fn multipart_text_fields_bind_like_urlencoded_ones() {
    let head = post("/register", "multipart/form-data; boundary=BOUND");
    let body = multipart_body(
        "BOUND",
        &[
            ("name", None, "wardonne"),
            ("address", None, "shanghai"),
            ("age", None, "10"),
            ("valid", None, "true"),
            ("tags", None, "a"),
            ("tags", None, "b"),
        ],
    );

    let mut registration = Registration::default();
    binding::bind_form(&head, &body, &mut registration)
        .await
        .unwrap();

    assert_eq!(registration.name, "wardonne");
    assert_eq!(registration.age, 10);
    assert!(registration.valid);
    assert_eq!(registration.tags, ["a", "b"]);
}

#[tokio::test]
async fn single_file_parts_bind_to_uploaded_file_fields() {
    #[derive(Default, formwork::Bind)]
    struct Upload {
        #[bind(form = "file1")]
        file1: Option<UploadedFile>,
        #[bind(form = "file2")]
        file2: Option<UploadedFile>,
    }

    let head = post("/upload", "multipart/form-data; boundary=BOUND");
    let body = multipart_body(
        "BOUND",
        &[
            ("file1", Some("filename1.txt"), "hello world in file1"),
            ("file2", Some("filename2.txt"), "hello world in file2"),
        ],
    );

    let mut upload = Upload::default();
    binding::bind_form(&head, &body, &mut upload).await.unwrap();

    let mut file1 = upload.file1.expect("file1 was uploaded");
    assert_eq!(file1.name(), "filename1.txt");
    assert_eq!(file1.content().unwrap(), &b"hello world in file1"[..]);

    let mut file2 = upload.file2.expect("file2 was uploaded");
    assert_eq!(file2.name(), "filename2.txt");
    assert_eq!(file2.content().unwrap(), &b"hello world in file2"[..]);
}

#[tokio::test]
async fn repeated_file_parts_bind_to_a_collection_in_upload_order() {
    #[derive(Default, formwork::Bind)]
    struct Upload {
        #[bind(form = "file[]")]
        files: UploadedFileCollection,
    }

    let head = post("/upload", "multipart/form-data; boundary=BOUND");
    let body = multipart_body(
        "BOUND",
        &[
            ("file[]", Some("filename1.txt"), "hello world in file1"),
            ("file[]", Some("filename2.txt"), "hello world in file2"),
        ],
    );

    let mut upload = Upload::default();
    binding::bind_form(&head, &body, &mut upload).await.unwrap();

    assert_eq!(upload.files.len(), 2);
    assert_eq!(upload.files[0].name(), "filename1.txt");
    assert_eq!(upload.files[1].name(), "filename2.txt");
    assert_eq!(
        upload.files[0].content().unwrap(),
        &b"hello world in file1"[..]
    );
}

#[tokio::test]
async fn values_and_files_bind_from_the_same_multipart_body() {
    #[derive(Default, formwork::Bind)]
    struct Mixed {
        #[bind(form = "name")]
        name: String,
        #[bind(form = "age")]
        age: i32,
        #[bind(form = "avatar")]
        avatar: Option<UploadedFile>,
    }

    let head = post("/profile", "multipart/form-data; boundary=BOUND");
    let body = multipart_body(
        "BOUND",
        &[
            ("name", None, "wardonne"),
            ("age", None, "10"),
            ("avatar", Some("avatar.png"), "pretend-png-bytes"),
        ],
    );

    let mut mixed = Mixed::default();
    binding::bind_form(&head, &body, &mut mixed).await.unwrap();

    assert_eq!(mixed.name, "wardonne");
    assert_eq!(mixed.age, 10);
    let mut avatar = mixed.avatar.expect("avatar was uploaded");
    assert_eq!(avatar.name(), "avatar.png");
    assert_eq!(avatar.content().unwrap(), &b"pretend-png-bytes"[..]);
}

#[tokio::test]
async fn fixed_length_array_mismatch_aborts_the_call() {
    #[derive(Default, formwork::Bind)]
    struct Palette {
        #[bind(form = "rgb")]
        rgb: [u8; 3],
    }

    let head = post("/palette", "application/x-www-form-urlencoded");
    let body = BufferedBody::from(&b"rgb=1&rgb=2"[..]);

    let mut palette = Palette::default();
    let err = binding::bind_form(&head, &body, &mut palette)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BindRequestError::Bind(BindError::ArityMismatch(_))
    ));
    // The failed call must not have touched the destination.
    assert_eq!(palette.rgb, [0, 0, 0]);
}

#[test]
fn records_without_matching_annotations_bind_as_a_no_op() {
    #[derive(Default, formwork::Bind)]
    struct Untouched {
        #[bind(param = "id")]
        id: u64,
        plain: String,
    }

    let source = ValueSource::from_pairs([("id", "42"), ("plain", "ignored")]);
    let mut untouched = Untouched::default();
    // `form` has no entries for this record: nothing is read, nothing fails.
    untouched.bind(&source, Namespace::Form).unwrap();
    assert_eq!(untouched.id, 0);
    assert_eq!(untouched.plain, "");
}
