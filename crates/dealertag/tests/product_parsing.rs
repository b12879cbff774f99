use dealertag::TrackingError;
use dealertag::config::TealiumConfig;
use dealertag::models::{EventPayload, PageFeatures, PageLocation, PageSnapshot};
use dealertag::product::{parse_products_data, product_analytics, product_list_arrays};
use serde_json::{Value, json};

fn payload(value: Value) -> EventPayload {
    value.as_object().cloned().expect("fixture must be an object")
}

fn details_config() -> TealiumConfig {
    TealiumConfig {
        page_type: "product details".to_string(),
        ..TealiumConfig::default()
    }
}

fn details_page(datasource: Option<&str>) -> PageSnapshot {
    PageSnapshot {
        location: PageLocation {
            href: "https://dealer.test/inventory/used-2021-can-am-defender".to_string(),
            pathname: "/inventory/used-2021-can-am-defender".to_string(),
            search: String::new(),
        },
        unit_analytics_data: datasource.map(str::to_string),
        features: PageFeatures {
            dealer360_spin: true,
            ..PageFeatures::default()
        },
        ..PageSnapshot::default()
    }
}

#[test]
fn sale_unit_reports_sale_price_and_discount() {
    let raw = "{&quot;productId&quot;:&quot;9001&quot;,&quot;item&quot;:&quot;  2021 Can-Am Defender  &quot;,\
&quot;itemMakeId&quot;:0,&quot;itemMake&quot;:&quot;Can-Am&quot;,&quot;itemYear&quot;:2021,\
&quot;usageStatus&quot;:&quot; Used&quot;,&quot;isUnitInventory&quot;:true,&quot;itemOnSale&quot;:true,\
&quot;salePrice&quot;:&quot;$7,499&quot;,&quot;discountAmount&quot;:500,&quot;itemOriginalPrice&quot;:7999,\
&quot;itemIndustry&quot;:&quot;Powersports &quot;}";

    let info = product_analytics(&details_config(), &details_page(Some(raw)))
        .expect("datasource should parse")
        .expect("product details pages produce data");

    assert_eq!(info["product_id"], json!("9001"));
    assert_eq!(info["product_name"], json!("2021 Can-Am Defender"));
    assert_eq!(info["product_condition"], json!("Used"));
    assert_eq!(info["product_industry"], json!("Powersports"));
    assert_eq!(info["product_on_sale"], json!(1));
    assert_eq!(info["product_price"], json!("7499"));
    assert_eq!(info["product_original_price"], json!(7999));
    assert_eq!(info["product_discount_amount"], json!(500));
    assert_eq!(info["product_type"], json!("Inventory"));
    assert_eq!(info["product_uri"], json!("/inventory/used-2021-can-am-defender"));
    assert_eq!(info["product_360view_count"], json!(1));
    assert_eq!(info["vdp_urgency_active"], json!(0));
    assert!(!info.contains_key("product_make"));
}

#[test]
fn showcase_units_default_to_new() {
    let raw = r#"{"productId": 12, "item": "Outlander", "isUnitInventory": false}"#;

    let info = product_analytics(&details_config(), &details_page(Some(raw)))
        .expect("datasource should parse")
        .expect("product details pages produce data");

    assert_eq!(info["product_condition"], json!("New"));
    assert_eq!(info["product_type"], json!("Showcase"));
    assert!(!info.contains_key("product_price"));
}

#[test]
fn product_analytics_only_runs_on_product_details_pages() {
    let result = product_analytics(&TealiumConfig::default(), &details_page(None));
    assert!(matches!(result, Ok(None)));
}

#[test]
fn missing_or_broken_datasource_is_an_error() {
    let missing = product_analytics(&details_config(), &details_page(None));
    assert!(matches!(missing, Err(TrackingError::MissingDomTarget(_))));

    let broken = product_analytics(&details_config(), &details_page(Some("{&quot;productId")));
    assert!(matches!(broken, Err(TrackingError::MalformedData { .. })));

    let not_object = product_analytics(&details_config(), &details_page(Some("[1, 2]")));
    assert!(matches!(not_object, Err(TrackingError::MalformedData { .. })));
}

#[test]
fn external_sites_report_the_parent_platform_id() {
    let config = TealiumConfig {
        is_external_branded_zone_site: true,
        parent_site_platform_type: "dealerspike".to_string(),
        ..details_config()
    };
    let raw = r#"{"productId": 12, "productExternalId": "DS-4410"}"#;

    let info = product_analytics(&config, &details_page(Some(raw)))
        .expect("datasource should parse")
        .expect("product details pages produce data");

    assert_eq!(info["product_id"], json!("DS-4410"));
    assert_eq!(info["product_external_id"], json!(["DS-4410"]));
    assert_eq!(info["product_external_platform"], json!(["dealerspike"]));
}

#[test]
fn event_detail_products_compute_discount_and_resolve_urls() {
    let item = payload(json!({
        "productId": 501,
        "item": "Rancher 420",
        "itemYear": 2024,
        "itemMake": "Honda",
        "itemUrl": "../inventory/rancher-501",
        "itemDisplayPrice": "$7,499",
        "itemOriginalPrice": "$7,999",
        "isUnitInventory": true,
        "imageCount": 14
    }));

    let product = parse_products_data(
        &TealiumConfig::default(),
        &item,
        "https://dealer.test/showroom/atv/",
    );

    assert_eq!(product["product_id"], json!(501));
    assert_eq!(product["product_name"], json!("Rancher 420"));
    assert_eq!(product["product_year"], json!(2024));
    assert_eq!(product["product_uri"], json!("/inventory/rancher-501"));
    assert_eq!(product["product_type"], json!("Inventory"));
    assert_eq!(product["product_price"], json!(7499));
    assert_eq!(product["product_original_price"], json!(7999));
    assert_eq!(product["product_discount_amount"], json!(500));
    assert_eq!(product["product_on_sale"], json!("0"));
    assert_eq!(product["product_custom_image_count"], json!(14));
}

#[test]
fn on_sale_flag_reads_text_and_skips_unknown_forms() {
    let config = TealiumConfig::default();
    let on_sale = payload(json!({"productId": 7, "itemOnSale": "True"}));
    let unknown_form = payload(json!({"productId": 7, "FormId": "1461"}));

    assert_eq!(
        parse_products_data(&config, &on_sale, "https://dealer.test/")["product_on_sale"],
        json!("1")
    );
    assert!(
        !parse_products_data(&config, &unknown_form, "https://dealer.test/")
            .contains_key("product_on_sale")
    );
}

#[test]
fn list_arrays_skip_junk_and_stay_aligned() {
    let config = TealiumConfig {
        is_external_branded_zone_site: true,
        parent_site_platform_type: "dealerspike".to_string(),
        ..TealiumConfig::default()
    };
    let datasources = vec![
        r#"{"itemMake": "Yamaha", "productExternalId": "9912-A", "isUnitInventory": "true", "itemOnSale": "TRUE"}"#.to_string(),
        r#"{"banner": "not a product"}"#.to_string(),
        "{oops".to_string(),
        r#"{"itemMake": "Kawasaki", "productId": 33, "vin": "JKA123"}"#.to_string(),
    ];

    let lists = product_list_arrays(&config, &datasources);

    assert_eq!(lists["product_list_makes"], json!(["Yamaha", "Kawasaki"]));
    assert_eq!(lists["product_list_ids"], json!([9912, 33]));
    assert_eq!(lists["product_list_types"], json!(["Inventory", "Showcase"]));
    assert_eq!(lists["product_list_on_sale"], json!(["1", "0"]));
    assert_eq!(lists["product_list_vins"], json!([null, "JKA123"]));
    assert_eq!(lists["product_external_id"], json!(["9912-A"]));
    assert_eq!(lists["product_external_platform"], json!(["dealerspike"]));
}

#[test]
fn no_product_records_means_no_arrays() {
    let lists = product_list_arrays(&TealiumConfig::default(), &["{}".to_string()]);
    assert!(lists.is_empty());
}
