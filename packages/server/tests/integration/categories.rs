use serde_json::json;

use crate::common::{TestApp, routes};

mod category_crud {
    use super::*;

    #[tokio::test]
    async fn create_get_and_list() {
        let app = TestApp::spawn().await;
        let root = app.create_category("Electronics", None).await;
        let child = app.create_category("Cables", Some(root)).await;

        let res = app.get(&routes::category(child)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Cables");
        assert_eq!(res.body["parent_id"], root);

        let res = app.get(routes::CATEGORIES).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post(routes::CATEGORIES, &json!({ "name": "   " })).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn update_renames_and_detaches_parent() {
        let app = TestApp::spawn().await;
        let root = app.create_category("Electronics", None).await;
        let child = app.create_category("Cables", Some(root)).await;

        let res = app
            .patch(&routes::category(child), &json!({ "name": "Wires", "parent_id": null }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "Wires");
        assert!(res.body["parent_id"].is_null());
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let app = TestApp::spawn().await;

        assert_eq!(app.get(&routes::category(5)).await.status, 404);
        assert_eq!(app.delete(&routes::category(5)).await.status, 404);
        let res = app.patch(&routes::category(5), &json!({ "name": "x" })).await;
        assert_eq!(res.status, 404);
    }
}

mod category_hierarchy {
    use super::*;

    #[tokio::test]
    async fn unknown_parent_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::CATEGORIES, &json!({ "name": "Orphan", "parent_id": 404 }))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn category_cannot_be_its_own_parent() {
        let app = TestApp::spawn().await;
        let id = app.create_category("Tools", None).await;

        let res = app.patch(&routes::category(id), &json!({ "parent_id": id })).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn moving_under_a_descendant_is_rejected() {
        let app = TestApp::spawn().await;
        let a = app.create_category("A", None).await;
        let b = app.create_category("B", Some(a)).await;
        let c = app.create_category("C", Some(b)).await;

        let res = app.patch(&routes::category(a), &json!({ "parent_id": c })).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let unchanged = app.get(&routes::category(a)).await;
        assert!(unchanged.body["parent_id"].is_null());
    }
}

mod category_deletion {
    use super::*;

    #[tokio::test]
    async fn delete_detaches_items_and_children() {
        let app = TestApp::spawn().await;
        let root = app.create_category("Kitchen", None).await;
        let child = app.create_category("Cutlery", Some(root)).await;
        let item = app.create_item(json!({ "name": "Kettle", "category_id": root })).await;

        let res = app.delete(&routes::category(root)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::category(root)).await.status, 404);

        let child = app.get(&routes::category(child)).await;
        assert!(child.body["parent_id"].is_null());

        let item = app.get(&routes::item(item)).await;
        assert_eq!(item.status, 200);
        assert!(item.body["category_id"].is_null());
    }
}
