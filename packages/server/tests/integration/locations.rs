use serde_json::json;

use crate::common::{TestApp, routes};

mod location_crud {
    use super::*;

    #[tokio::test]
    async fn create_keeps_coordinates() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::LOCATIONS,
                &json!({
                    "name": "Garage shelf B",
                    "location_type": "shelf",
                    "x_coord": 1.5,
                    "y_coord": 0.0,
                    "z_coord": 2.25,
                    "latitude": 52.52,
                    "longitude": 13.405,
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["location_type"], "shelf");
        assert_eq!(res.body["z_coord"], 2.25);
        assert_eq!(res.body["latitude"], 52.52);
        assert!(res.body["model_url"].is_null());
    }

    #[tokio::test]
    async fn out_of_range_coordinates_are_rejected() {
        let app = TestApp::spawn().await;

        for body in [
            json!({ "name": "Pole", "latitude": 91.0 }),
            json!({ "name": "Pole", "longitude": -180.5 }),
        ] {
            let res = app.post(routes::LOCATIONS, &body).await;
            assert_eq!(res.status, 400, "{body}");
            assert_eq!(res.code(), "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn list_filters_by_type() {
        let app = TestApp::spawn().await;
        app.create_location(json!({ "name": "Shelf A", "location_type": "shelf" })).await;
        app.create_location(json!({ "name": "Garage", "location_type": "room" })).await;
        app.create_location(json!({ "name": "Shelf B", "location_type": "shelf" })).await;

        let res = app.get(&format!("{}?location_type=shelf", routes::LOCATIONS)).await;

        assert_eq!(res.status, 200);
        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Shelf A", "Shelf B"]);
    }

    #[tokio::test]
    async fn update_clears_nullable_fields() {
        let app = TestApp::spawn().await;
        let id = app
            .create_location(json!({ "name": "Box", "latitude": 10.0, "longitude": 20.0 }))
            .await;

        let res = app
            .patch(&routes::location(id), &json!({ "latitude": null, "location_type": "box" }))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["latitude"].is_null());
        assert_eq!(res.body["longitude"], 20.0);
        assert_eq!(res.body["location_type"], "box");
    }
}

mod location_hierarchy {
    use super::*;

    #[tokio::test]
    async fn nested_locations_cannot_form_a_cycle() {
        let app = TestApp::spawn().await;
        let house = app.create_location(json!({ "name": "House" })).await;
        let room = app
            .create_location(json!({ "name": "Office", "parent_id": house }))
            .await;

        let res = app.patch(&routes::location(house), &json!({ "parent_id": room })).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod location_deletion {
    use super::*;

    #[tokio::test]
    async fn delete_detaches_items() {
        let app = TestApp::spawn().await;
        let shelf = app.create_location(json!({ "name": "Shelf" })).await;
        let item = app.create_item(json!({ "name": "Drill", "location_id": shelf })).await;

        let res = app.delete(&routes::location(shelf)).await;
        assert_eq!(res.status, 204);

        let item = app.get(&routes::item(item)).await;
        assert!(item.body["location_id"].is_null());
        assert_eq!(app.get(&routes::location(shelf)).await.status, 404);
    }
}
