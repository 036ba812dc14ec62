#![allow(missing_docs)]

use core::convert::Infallible;
use dproxy::{
    deferred::{Deferred, defer_fn},
    error::DeferError,
    value::Value,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    age: u32,
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: u64,
    profile: Profile,
    manager: Option<Box<User>>,
}

fn ann() -> User {
    User {
        id: 7,
        profile: Profile {
            name: "ann".into(),
            age: 41,
            tags: vec!["ops".into(), "oncall".into()],
        },
        manager: None,
    }
}

#[tokio::test]
async fn typed_chain_goes_dynamic() {
    let fetch_user = defer_fn(|id: u64| async move { Ok::<_, Infallible>(User { id, ..ann() }) });
    let user = fetch_user(9).dynamic();
    assert_eq!(user.get("id").await.expect("id"), Value::from(9));
    assert_eq!(
        user.get("profile").get("tags").index(1).await.expect("tag"),
        Value::from("oncall")
    );
    assert_eq!(user.get("manager").await.expect("manager"), Value::Null);
    assert!(user.get("manager").get("id").await.expect("no manager").is_undefined());
}

#[tokio::test]
async fn dynamic_chain_decodes_back() {
    let user = Deferred::resolve(ann());
    let profile: Profile = user.dynamic().get("profile").decode().await.expect("profile");
    assert_eq!(profile, ann().profile);

    let age: u32 = user.dynamic().get("profile").get("age").decode().await.expect("age");
    assert_eq!(age, 41);

    let typed = user.fmap(|u| u.profile.tags.len());
    assert_eq!(typed.await.expect("len"), 2);
}

#[tokio::test]
async fn decode_failures_reject() {
    let user = Deferred::resolve(ann()).dynamic();
    let wrong: Deferred<Profile> = user.get("id").decode();
    assert!(matches!(wrong.await, Err(DeferError::Json(_))));

    let missing: Deferred<u32> = user.get("nothing").decode();
    assert!(matches!(
        missing.await,
        Err(DeferError::Unrepresentable { found: "undefined" })
    ));
}
