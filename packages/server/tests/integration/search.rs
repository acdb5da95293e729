use serde_json::{Value, json};

use crate::common::{TestApp, routes, solid_png, split_png};

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect()
}

mod text_search {
    use super::*;

    #[tokio::test]
    async fn query_matches_name_description_and_ai_description() {
        let app = TestApp::spawn().await;
        app.create_item(json!({ "name": "Desk light", "description": "A brass desk LAMP" })).await;
        app.create_item(json!({ "name": "Chair" })).await;
        let ai = app.create_item(json!({ "name": "Heirloom" })).await;
        app.db_set_item_ai_description(ai, "vintage lamp").await;
        app.create_item(json!({ "name": "Lampshade" })).await;

        let res = app.get(&format!("{}?q=lamp", routes::SEARCH_ITEMS)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(names(&res.body), vec!["Desk light", "Heirloom", "Lampshade"]);
    }

    #[tokio::test]
    async fn wildcards_are_matched_literally() {
        let app = TestApp::spawn().await;
        app.create_item(json!({ "name": "50% off voucher" })).await;
        app.create_item(json!({ "name": "500 screws" })).await;

        let res = app.get(&format!("{}?q=50%25", routes::SEARCH_ITEMS)).await;

        assert_eq!(names(&res.body), vec!["50% off voucher"]);
    }

    #[tokio::test]
    async fn tags_must_all_be_present() {
        let app = TestApp::spawn().await;
        app.create_item(json!({ "name": "Pot", "tags": ["Kitchen", "steel"] })).await;
        app.create_item(json!({ "name": "Kettle", "tags": ["kitchen", "brass"] })).await;
        app.create_item(json!({ "name": "Doorknob", "tags": ["brass"] })).await;

        let res = app.get(&format!("{}?tags=kitchen,brass", routes::SEARCH_ITEMS)).await;
        assert_eq!(names(&res.body), vec!["Kettle"]);

        let res = app.get(&format!("{}?tags=KITCHEN", routes::SEARCH_ITEMS)).await;
        assert_eq!(names(&res.body), vec!["Pot", "Kettle"]);
    }

    #[tokio::test]
    async fn filters_combine_with_the_query() {
        let app = TestApp::spawn().await;
        let tools = app.create_category("Tools", None).await;
        let shed = app.create_location(json!({ "name": "Shed" })).await;
        app.create_item(json!({ "name": "Hammer", "category_id": tools, "location_id": shed })).await;
        app.create_item(json!({ "name": "Toy hammer" })).await;
        app.create_item(json!({ "name": "Hammer drill", "category_id": tools })).await;

        let res = app
            .get(&format!("{}?q=hammer&category_id={tools}", routes::SEARCH_ITEMS))
            .await;
        assert_eq!(names(&res.body), vec!["Hammer", "Hammer drill"]);

        let res = app
            .get(&format!("{}?q=hammer&location_id={shed}", routes::SEARCH_ITEMS))
            .await;
        assert_eq!(names(&res.body), vec!["Hammer"]);
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let app = TestApp::spawn().await;
        for name in ["Cup A", "Cup B", "Cup C"] {
            app.create_item(json!({ "name": name })).await;
        }

        let res = app.get(&format!("{}?q=cup&limit=2", routes::SEARCH_ITEMS)).await;
        assert_eq!(names(&res.body), vec!["Cup A", "Cup B"]);

        let res = app.get(&format!("{}?limit=0", routes::SEARCH_ITEMS)).await;
        assert_eq!(res.status, 400);
    }
}

mod image_search {
    use super::*;

    const RED: [u8; 3] = [255, 0, 0];
    const BLUE: [u8; 3] = [0, 0, 255];

    async fn seed(app: &TestApp) -> (i32, i32, i32) {
        let red = app.create_item(json!({ "name": "Red mug" })).await;
        let blue = app.create_item(json!({ "name": "Blue mug" })).await;
        let mixed = app.create_item(json!({ "name": "Red and blue flag" })).await;
        app.upload_image(red, solid_png(255, 0, 0), false).await;
        app.upload_image(blue, solid_png(0, 0, 255), false).await;
        app.upload_image(mixed, split_png(RED, BLUE, 48), false).await;
        (red, blue, mixed)
    }

    async fn search(app: &TestApp, query: &str, bytes: Vec<u8>) -> crate::common::TestResponse {
        app.upload(
            &format!("{}{query}", routes::SEARCH_BY_IMAGE),
            "query.png",
            bytes,
            &[],
        )
        .await
    }

    #[tokio::test]
    async fn results_are_ranked_by_similarity() {
        let app = TestApp::spawn().await;
        let (red, _, mixed) = seed(&app).await;

        let res = search(&app, "", solid_png(255, 0, 0)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["count"], 2);
        let results = res.body["results"].as_array().unwrap();
        assert_eq!(results[0]["item"]["id"], red);
        assert_eq!(results[1]["item"]["id"], mixed);
        assert!(results[0]["similarity"].as_f64().unwrap() > 0.999);
        let second = results[1]["similarity"].as_f64().unwrap();
        assert!(second >= 0.5 && second < 1.0, "{second}");
    }

    #[tokio::test]
    async fn threshold_and_limit_apply() {
        let app = TestApp::spawn().await;
        let (red, _, _) = seed(&app).await;

        let res = search(&app, "?threshold=0.99", solid_png(255, 0, 0)).await;
        assert_eq!(res.body["count"], 1);
        assert_eq!(res.body["results"][0]["item"]["id"], red);

        let res = search(&app, "?threshold=0&limit=2", solid_png(255, 0, 0)).await;
        assert_eq!(res.body["count"], 2);

        let res = search(&app, "?threshold=0", solid_png(255, 0, 0)).await;
        assert_eq!(res.body["count"], 3);
    }

    #[tokio::test]
    async fn undecodable_query_finds_nothing() {
        let app = TestApp::spawn().await;
        seed(&app).await;

        let res = search(&app, "", b"definitely not a picture".to_vec()).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({ "results": [], "count": 0 }));
    }

    #[tokio::test]
    async fn images_without_embedding_are_skipped() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Manual" })).await;
        app.upload(&routes::item_images(item), "manual.png", b"text".to_vec(), &[])
            .await;

        let res = search(&app, "?threshold=0", solid_png(255, 0, 0)).await;

        assert_eq!(res.body["count"], 0);
    }

    #[tokio::test]
    async fn out_of_range_parameters_are_rejected() {
        let app = TestApp::spawn().await;

        let res = search(&app, "?threshold=1.5", solid_png(255, 0, 0)).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let res = search(&app, "?limit=0", solid_png(255, 0, 0)).await;
        assert_eq!(res.status, 400);
    }
}
