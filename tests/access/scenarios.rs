//! End-to-end resolution over the shared collection.
//!
//! Principals are built from claims through `create_principal`, exactly as a
//! request handler would, then queried in both batch and point mode.

use docaccess::{
    Accessor, Claims, Error, GrantRelation, Permission, ResourceStatus, Role, StaticDirectory,
    create_principal,
};

use super::{C1, C2, grant, levels, seeded_store};

const USER: i64 = 10;

fn user_claims(scopes: &[&str]) -> Claims {
    Claims {
        sub: USER,
        organization_id: C1,
        roles: vec!["Member".into()],
        scopes: scopes.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// Explicit user grants only: deleted documents are excluded by the caller's
/// status filter, but still resolvable under `Archived`.
#[tokio::test]
async fn explicit_grants_with_status_filter() {
    let store = seeded_store().await;
    grant(&store, GrantRelation::User, 2, USER, Permission::Manage).await;
    grant(&store, GrantRelation::User, 3, USER, Permission::Manage).await;
    grant(&store, GrantRelation::User, 6, USER, Permission::View).await;

    let principal = create_principal(&user_claims(&[]), &StaticDirectory::new())
        .await
        .unwrap();
    assert_eq!(principal.role(), Role::NormalUser);
    let accessor = principal.accessor();

    let live = accessor
        .query()
        .with_status(ResourceStatus::Exists)
        .collect(&store)
        .await
        .unwrap();
    assert_eq!(
        levels(&live),
        vec![(2, Permission::Manage), (3, Permission::Manage)]
    );

    let everything = accessor.query().collect(&store).await.unwrap();
    assert_eq!(
        levels(&everything),
        vec![
            (2, Permission::Manage),
            (3, Permission::Manage),
            (6, Permission::View)
        ]
    );

    assert_eq!(
        accessor
            .permission_of(&store, 6, ResourceStatus::Archived)
            .await
            .unwrap(),
        Permission::View
    );
    assert_eq!(
        accessor
            .permission_of(&store, 1, ResourceStatus::Exists)
            .await
            .unwrap(),
        Permission::None
    );
}

/// Own-company administration applies to live and archived documents alike.
#[tokio::test]
async fn own_company_rule_over_administered_organizations() {
    let store = seeded_store().await;
    grant(&store, GrantRelation::User, 3, USER, Permission::Manage).await;

    let directory = StaticDirectory::new().with(USER, [C1, C2]);
    let principal = create_principal(&user_claims(&[]), &directory).await.unwrap();
    let accessor = principal.accessor();

    for id in [1, 2, 3, 5] {
        assert_eq!(
            accessor
                .permission_of(&store, id, ResourceStatus::Exists)
                .await
                .unwrap(),
            Permission::Manage,
            "document {id}"
        );
    }
    assert_eq!(
        accessor
            .permission_of(&store, 4, ResourceStatus::Exists)
            .await
            .unwrap(),
        Permission::None
    );
    assert_eq!(
        accessor
            .permission_of(&store, 6, ResourceStatus::Archived)
            .await
            .unwrap(),
        Permission::Manage
    );

    let live = accessor
        .query()
        .with_status(ResourceStatus::Exists)
        .collect(&store)
        .await
        .unwrap();
    let ids: Vec<i64> = live.iter().map(|r| r.document.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5]);
}

/// Survey rights reach only data templates; CDL read lifts everything else to View.
#[tokio::test]
async fn scope_rules() {
    let store = seeded_store().await;
    grant(&store, GrantRelation::Organization, 1, C1, Permission::Manage).await;

    let principal = create_principal(
        &user_claims(&["api.surveyrights", "api.cdl.read", "api.admin"]),
        &StaticDirectory::new(),
    )
    .await
    .unwrap();
    let accessor = principal.accessor();

    let live = accessor
        .query()
        .with_status(ResourceStatus::Exists)
        .collect(&store)
        .await
        .unwrap();
    assert_eq!(
        levels(&live),
        vec![
            (1, Permission::Manage),
            (2, Permission::View),
            (3, Permission::View),
            (4, Permission::Manage),
            (5, Permission::View),
        ]
    );

    let templates = accessor
        .query()
        .of_type("DataTemplate")
        .collect(&store)
        .await
        .unwrap();
    assert_eq!(levels(&templates), vec![(4, Permission::Manage)]);

    assert!(
        accessor
            .has_permission(&store, 4, Permission::Manage, ResourceStatus::Exists)
            .await
            .unwrap()
    );
    assert!(
        !accessor
            .has_permission(&store, 3, Permission::Manage, ResourceStatus::Exists)
            .await
            .unwrap()
    );
}

/// Survey rights without CDL read leave non-template documents at their explicit level.
#[tokio::test]
async fn survey_rights_alone() {
    let store = seeded_store().await;

    let principal = create_principal(&user_claims(&["api.surveyrights"]), &StaticDirectory::new())
        .await
        .unwrap();
    let accessor = principal.accessor();

    let everything = accessor.query().collect(&store).await.unwrap();
    assert_eq!(levels(&everything), vec![(4, Permission::Manage)]);
    assert_eq!(
        accessor
            .permission_of(&store, 3, ResourceStatus::Exists)
            .await
            .unwrap(),
        Permission::None
    );
}

/// Administrators manage everything that exists, and nothing that does not.
#[tokio::test]
async fn administrator_bypasses_grants() {
    let store = seeded_store().await;
    let claims = Claims {
        sub: 1,
        organization_id: C2,
        roles: vec!["Administrator".into()],
        ..Default::default()
    };
    let principal = create_principal(&claims, &StaticDirectory::new())
        .await
        .unwrap();
    let accessor = principal.accessor();

    let everything = accessor.query().collect(&store).await.unwrap();
    assert_eq!(everything.len(), 6);
    assert!(everything.iter().all(|r| r.permission == Permission::Manage));

    assert_eq!(
        accessor
            .permission_of(&store, 6, ResourceStatus::Archived)
            .await
            .unwrap(),
        Permission::Manage
    );
    for (id, status) in [(6, ResourceStatus::Exists), (1, ResourceStatus::Archived), (99, ResourceStatus::Exists)] {
        let result = accessor.permission_of(&store, id, status).await;
        assert!(matches!(result, Err(Error::NotFound(_))), "{id} {status:?}");
    }
}

/// Missing documents are NotFound for ordinary users, even through has_permission.
#[tokio::test]
async fn ordinary_user_not_found() {
    let store = seeded_store().await;
    let principal = create_principal(&user_claims(&[]), &StaticDirectory::new())
        .await
        .unwrap();
    let accessor = principal.accessor();

    let result = accessor
        .permission_of(&store, 99, ResourceStatus::Exists)
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = accessor
        .has_permission(&store, 99, Permission::View, ResourceStatus::Exists)
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));

    let result = accessor
        .has_permission(&store, 1, Permission::None, ResourceStatus::Exists)
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

/// Paging composes with the permission filter and reports the unpaged total.
#[tokio::test]
async fn paging_over_permitted_documents() {
    let store = seeded_store().await;
    let directory = StaticDirectory::new().with(USER, [C1, C2]);
    let principal = create_principal(&user_claims(&[]), &directory).await.unwrap();

    let query = principal
        .accessor()
        .query()
        .with_status(ResourceStatus::Exists)
        .order_by(docaccess::Order::IdDesc)
        .limit(2)
        .offset(1);

    let page = query.collect(&store).await.unwrap();
    let ids: Vec<i64> = page.iter().map(|r| r.document.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(query.count(&store).await.unwrap(), 4);
}
