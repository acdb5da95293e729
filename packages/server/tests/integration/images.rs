use sea_orm::EntityTrait;
use serde_json::json;

use inventory_server::entity::item_image;

use crate::common::{MAX_UPLOAD, STUB_DESCRIPTION, StubVision, TestApp, routes, solid_png};

mod image_upload {
    use super::*;

    #[tokio::test]
    async fn png_upload_is_analysed_and_indexed() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;

        let res = app
            .upload(&routes::item_images(item), "lamp.png", solid_png(200, 30, 30), &[])
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["message"], "Image uploaded successfully");
        let image = &res.body["image"];
        assert_eq!(image["item_id"], item);
        assert_eq!(image["original_filename"], "lamp.png");
        assert_eq!(image["format"], "PNG");
        assert_eq!(image["width"], 64);
        assert_eq!(image["height"], 64);
        assert_eq!(image["has_embedding"], true);
        assert_eq!(image["is_primary"], false);
        assert_eq!(image["ai_description"], STUB_DESCRIPTION);
        assert_eq!(res.body["ai_analysis"]["description"], STUB_DESCRIPTION);
        assert_eq!(res.body["ai_analysis"]["confidence"], 0.8);
        assert_eq!(app.vision.calls(), 1);

        let stored = item_image::Entity::find_by_id(res.body["image_id"].as_i64().unwrap() as i32)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.embedding.unwrap().0.len(), ::common::FEATURE_DIM);
    }

    #[tokio::test]
    async fn first_analysis_is_promoted_to_the_item() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;

        app.upload_image(item, solid_png(10, 10, 200), false).await;

        let res = app.get(&routes::item(item)).await;
        assert_eq!(res.body["ai_description"], STUB_DESCRIPTION);
        assert_eq!(res.body["ai_tags"], json!(["vintage", "brass", "lamp"]));
    }

    #[tokio::test]
    async fn unreadable_bytes_are_stored_without_analysis() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Manual" })).await;

        let res = app
            .upload(&routes::item_images(item), "manual.png", b"not an image".to_vec(), &[])
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["image"]["has_embedding"], false);
        assert!(res.body["image"]["format"].is_null());
        assert!(res.body["image"]["width"].is_null());
        assert_eq!(res.body["ai_analysis"]["description"], "");
        assert_eq!(res.body["ai_analysis"]["confidence"], 0.0);
        assert_eq!(app.vision.calls(), 0);

        let item = app.get(&routes::item(item)).await;
        assert!(item.body["ai_description"].is_null());
    }

    #[tokio::test]
    async fn unavailable_vision_still_stores_the_image() {
        let app = TestApp::spawn_with(StubVision::unavailable()).await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;

        let res = app
            .upload(&routes::item_images(item), "lamp.png", solid_png(1, 2, 3), &[])
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["image"]["has_embedding"], true);
        assert!(res.body["image"]["ai_description"].is_null());
        assert_eq!(res.body["ai_analysis"]["confidence"], 0.0);
        assert!(app.get(&routes::item(item)).await.body["ai_description"].is_null());
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;
        let form = reqwest::multipart::Form::new().text("is_primary", "true");

        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::item_images(item)))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;

        let res = app.upload(&routes::item_images(item), "empty.png", Vec::new(), &[]).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;
        let big = vec![0u8; MAX_UPLOAD as usize + 1];

        let res = app.upload(&routes::item_images(item), "big.png", big, &[]).await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.code(), "PAYLOAD_TOO_LARGE");
        assert!(app.get(&routes::item_images(item)).await.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_to_missing_item_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .upload(&routes::item_images(99), "lamp.png", solid_png(1, 1, 1), &[])
            .await;

        assert_eq!(res.status, 404);
    }
}

mod primary_image {
    use super::*;

    #[tokio::test]
    async fn later_non_primary_upload_keeps_item_description() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;
        app.upload_image(item, solid_png(200, 0, 0), false).await;

        app.db_set_item_ai_description(item, "hand written").await;
        app.upload_image(item, solid_png(0, 200, 0), false).await;

        let res = app.get(&routes::item(item)).await;
        assert_eq!(res.body["ai_description"], "hand written");
    }

    #[tokio::test]
    async fn primary_upload_replaces_description_and_previous_primary() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;
        let first = app.upload_image(item, solid_png(200, 0, 0), true).await;
        app.db_set_item_ai_description(item, "hand written").await;

        let second = app.upload_image(item, solid_png(0, 0, 200), true).await;

        let res = app.get(&routes::item(item)).await;
        assert_eq!(res.body["ai_description"], STUB_DESCRIPTION);

        let first = app.get(&routes::item_image(item, first)).await;
        let second = app.get(&routes::item_image(item, second)).await;
        assert_eq!(first.body["is_primary"], false);
        assert_eq!(second.body["is_primary"], true);
    }

    #[tokio::test]
    async fn invalid_primary_flag_is_rejected() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;

        let res = app
            .upload(
                &routes::item_images(item),
                "lamp.png",
                solid_png(1, 1, 1),
                &[("is_primary", "perhaps")],
            )
            .await;

        assert_eq!(res.status, 400);
    }
}

mod image_access {
    use super::*;

    #[tokio::test]
    async fn download_returns_stored_bytes() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;
        let bytes = solid_png(90, 90, 90);
        let image = app.upload_image(item, bytes.clone(), false).await;

        let (status, content_type, body) = app.get_bytes(&routes::item_image_file(item, image)).await;

        assert_eq!(status, 200);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(body, bytes);
    }

    #[tokio::test]
    async fn list_returns_images_in_upload_order() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;
        let a = app.upload_image(item, solid_png(1, 0, 0), false).await;
        let b = app.upload_image(item, solid_png(0, 1, 0), false).await;

        let res = app.get(&routes::item_images(item)).await;

        let ids: Vec<i64> = res.body.as_array().unwrap().iter().map(|i| i["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![a as i64, b as i64]);
        assert!(res.body[0].get("file_path").is_none());
    }

    #[tokio::test]
    async fn image_of_another_item_is_not_found() {
        let app = TestApp::spawn().await;
        let lamp = app.create_item(json!({ "name": "Lamp" })).await;
        let chair = app.create_item(json!({ "name": "Chair" })).await;
        let image = app.upload_image(lamp, solid_png(5, 5, 5), false).await;

        let res = app.get(&routes::item_image(chair, image)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Image not found");
    }

    #[tokio::test]
    async fn delete_removes_row_and_file() {
        let app = TestApp::spawn().await;
        let item = app.create_item(json!({ "name": "Lamp" })).await;
        let image = app.upload_image(item, solid_png(5, 5, 5), false).await;
        let meta = app.get(&routes::item_image(item, image)).await;
        let stored = app.upload_dir.join(meta.body["filename"].as_str().unwrap());

        let res = app.delete(&routes::item_image(item, image)).await;

        assert_eq!(res.status, 204);
        assert_eq!(app.get(&routes::item_image(item, image)).await.status, 404);
        assert!(!stored.exists());
    }
}
