//! Principal construction failures.
//!
//! Every construction failure collapses into the same payload-free error so
//! that a caller cannot tell bad claims from a backend outage.

use docaccess::directory::UnavailableDirectory;
use docaccess::{Claims, Error, Role, StaticDirectory, create_principal};

#[tokio::test]
async fn malformed_claims_and_outages_are_indistinguishable() {
    let bad_claims = Claims {
        sub: -5,
        organization_id: 1,
        ..Default::default()
    };
    let good_claims = Claims {
        sub: 5,
        organization_id: 1,
        ..Default::default()
    };

    let malformed = create_principal(&bad_claims, &StaticDirectory::new())
        .await
        .unwrap_err();
    let outage = create_principal(&good_claims, &UnavailableDirectory)
        .await
        .unwrap_err();

    assert!(matches!(malformed, Error::Security));
    assert!(matches!(outage, Error::Security));
    assert_eq!(malformed.to_string(), outage.to_string());
    assert_eq!(malformed.public_message(), outage.public_message());
}

#[tokio::test]
async fn outage_does_not_affect_administrators_or_end_users() {
    let admin = Claims {
        sub: 1,
        organization_id: 1,
        roles: vec!["SystemAdministrator".into()],
        ..Default::default()
    };
    let principal = create_principal(&admin, &UnavailableDirectory).await.unwrap();
    assert_eq!(principal.role(), Role::Administrator);

    let end_user = Claims {
        sub: 2,
        organization_id: 3,
        end_user: true,
        ..Default::default()
    };
    let principal = create_principal(&end_user, &UnavailableDirectory).await.unwrap();
    assert_eq!(principal.role(), Role::EndUser);
}

#[tokio::test]
async fn claims_from_json() {
    let claims: Claims = serde_json::from_str(
        r#"{
            "sub": 12,
            "organization_id": 4,
            "roles": ["CompanyAdministrator", "Reviewer"],
            "scope": "openid api.cdl.read"
        }"#,
    )
    .unwrap();

    let principal = create_principal(&claims, &StaticDirectory::new().with(12, [8]))
        .await
        .unwrap();
    assert_eq!(principal.role(), Role::NormalUser);
    assert_eq!(principal.id(), 12);
    assert_eq!(principal.organization_id(), 4);
    assert_eq!(
        principal.admin_organizations().iter().copied().collect::<Vec<_>>(),
        vec![4, 8]
    );
    assert!(principal.scopes().contains(docaccess::Scope::CdlRead));
}
