mod common;

use common::{insert_post, insert_published, insert_term, open_fixture_db, relate, scribble, NewPost};
use scribble_core::{TaxonomyKind, TaxonomyQuery, DEFAULT_SELECTION_LIMIT};

#[test]
fn post_selection_returns_newest_members_first() {
    let conn = open_fixture_db();
    let travel = insert_term(&conn, "category", "Travel", "travel");
    let mut members = Vec::new();
    for day in 1..=5 {
        let id = insert_published(&conn, &format!("Trip {day}"), &format!("2024-02-0{day} 08:00:00"));
        relate(&conn, id, travel, 0);
        members.push(id);
    }
    let scribble = scribble(&conn);

    let taxonomy = scribble.taxonomy(travel).unwrap().expect("taxonomy exists");
    let selection: Vec<i64> = taxonomy
        .post_selection(2)
        .unwrap()
        .iter()
        .map(|post| post.id())
        .collect();
    assert_eq!(selection, vec![members[4], members[3]]);

    let default_selection = taxonomy.post_selection(DEFAULT_SELECTION_LIMIT).unwrap();
    assert_eq!(default_selection.len(), 4);
}

#[test]
fn post_selection_orders_by_gmt_date() {
    let conn = open_fixture_db();
    let news = insert_term(&conn, "category", "News", "news");
    let earlier_gmt = insert_post(
        &conn,
        NewPost {
            title: "Local later",
            post_date: "2024-02-02 01:00:00",
            post_date_gmt: Some("2024-02-01 20:00:00"),
            ..NewPost::default()
        },
    );
    let later_gmt = insert_post(
        &conn,
        NewPost {
            title: "Local earlier",
            post_date: "2024-02-01 23:00:00",
            post_date_gmt: Some("2024-02-01 23:00:00"),
            ..NewPost::default()
        },
    );
    relate(&conn, earlier_gmt, news, 0);
    relate(&conn, later_gmt, news, 0);
    let scribble = scribble(&conn);

    let taxonomy = scribble.taxonomy(news).unwrap().unwrap();
    let ids: Vec<i64> = taxonomy
        .post_selection(DEFAULT_SELECTION_LIMIT)
        .unwrap()
        .iter()
        .map(|post| post.id())
        .collect();
    assert_eq!(ids, vec![later_gmt, earlier_gmt]);
}

#[test]
fn posts_include_only_published_post_members() {
    let conn = open_fixture_db();
    let cooking = insert_term(&conn, "post_tag", "Cooking", "cooking");
    let member = insert_published(&conn, "Soup", "2024-01-01 10:00:00");
    let draft = insert_post(
        &conn,
        NewPost {
            title: "Stew draft",
            status: "draft",
            ..NewPost::default()
        },
    );
    let page = insert_post(
        &conn,
        NewPost {
            title: "Recipes",
            post_type: "page",
            ..NewPost::default()
        },
    );
    insert_published(&conn, "Unrelated", "2024-01-02 10:00:00");
    for id in [member, draft, page] {
        relate(&conn, id, cooking, 0);
    }
    let scribble = scribble(&conn);

    let taxonomy = scribble.taxonomy(cooking).unwrap().unwrap();
    assert!(taxonomy.is_tag());
    let posts: Vec<i64> = taxonomy.posts().unwrap().iter().map(|post| post.id()).collect();
    assert_eq!(posts, vec![member]);
}

#[test]
fn tag_and_category_queries_filter_the_discriminator() {
    let conn = open_fixture_db();
    let category = insert_term(&conn, "category", "Rust", "rust");
    let tag = insert_term(&conn, "post_tag", "Rust", "rust");
    let custom = insert_term(&conn, "series", "Rust", "rust");
    let scribble = scribble(&conn);

    let tags = scribble
        .taxonomies(&TaxonomyQuery::new().tag().slug("rust"))
        .unwrap();
    assert_eq!(tags.iter().map(|node| node.id()).collect::<Vec<_>>(), vec![tag]);

    let categories = scribble
        .taxonomies(&TaxonomyQuery::new().category().named("Rust"))
        .unwrap();
    assert_eq!(
        categories.iter().map(|node| node.id()).collect::<Vec<_>>(),
        vec![category]
    );

    let series = scribble
        .taxonomies(&TaxonomyQuery::new().of_kind(TaxonomyKind::parse("series")))
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].id(), custom);
    assert!(!series[0].is_tag() && !series[0].is_category());

    let all = scribble
        .taxonomies(&TaxonomyQuery::new().slug("rust").limit(2))
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn missing_taxonomy_is_none() {
    let conn = open_fixture_db();
    let scribble = scribble(&conn);
    assert!(scribble.taxonomy(404).unwrap().is_none());
}
