#![cfg(feature = "live")]

use osapi_client::core::InfoReq;
use osapi_test_suite::*;
use osapi_testing::{new_client, tst::TestOpenSearchCtx};

#[tokio::test]
async fn alias_sequence_in_container() {
    let ctx = TestOpenSearchCtx::new().await;
    let harness = Harness::live(ctx.client.clone());

    harness.run_sequence().await;
}

#[tokio::test]
async fn alias_cases_in_container() {
    let ctx = TestOpenSearchCtx::new().await;
    let harness = Harness::live(ctx.client.clone());

    for category in Category::ALL {
        for sub in category.sub_cases() {
            harness.cleanup().await;
            harness.prepare(category).await.unwrap();

            let result = harness.run(category, *sub).await;
            check(category, *sub, &result);
        }
    }
    harness.cleanup().await;
}

#[tokio::test]
#[ignore = "needs a cluster at OPENSEARCH_URL"]
async fn alias_sequence_from_environment() {
    let harness = Harness::live(new_client());
    harness
        .client
        .info(&InfoReq::default())
        .await
        .unwrap();

    harness.run_sequence().await;
}
