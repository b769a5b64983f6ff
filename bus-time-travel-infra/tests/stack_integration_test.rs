use bus_time_travel_infra::{
    deploy, lambda_logs_policy, read_from_bucket_role, write_to_bucket_role, Bucket,
    DeploymentConfig, Manifest, NamingStrategy, PolicyDocument, ProviderContext, ResourceType,
    Stack,
};
use tempfile::TempDir;

fn context() -> ProviderContext {
    ProviderContext::new("aws", "us-east-1", "123456789012")
}

fn document(manifest: &Manifest, policy_name: &str) -> PolicyDocument {
    let policy = manifest
        .resource(ResourceType::Policy, policy_name)
        .unwrap_or_else(|| panic!("policy '{policy_name}' missing from manifest"));
    serde_json::from_str(policy.input_str("policy").expect("policy input should be a string"))
        .expect("policy input should be a valid document")
}

#[tokio::test]
async fn test_history_reader_role_end_to_end() {
    let mut stack = Stack::new("dev");
    let logs = lambda_logs_policy(&mut stack, "shared-lambda-logs").unwrap();
    let bucket = Bucket::new(&mut stack, "bus-time-travel").unwrap();
    let role = read_from_bucket_role(&mut stack, "get_history_role", &bucket, &logs).unwrap();

    let manifest = stack
        .synthesize(&context(), NamingStrategy::Exact)
        .await
        .unwrap();

    let read = document(&manifest, "get_history_role-s3-read");
    assert_eq!(read.statement.len(), 1);
    assert_eq!(read.statement[0].action.actions(), vec!["s3:GetObject"]);
    assert_eq!(
        read.statement[0].resource.as_deref(),
        Some("arn:aws:s3:::bus-time-travel/*")
    );

    let logs_document = document(&manifest, "shared-lambda-logs");
    assert_eq!(
        logs_document.statement[0].action.actions(),
        vec![
            "logs:CreateLogGroup",
            "logs:CreateLogStream",
            "logs:PutLogEvents"
        ]
    );

    let attached: Vec<&str> = manifest
        .policies_of(&role.urn)
        .iter()
        .map(|policy| policy.name.as_str())
        .collect();
    assert_eq!(attached.len(), 2);
    assert!(attached.contains(&"shared-lambda-logs"));
    assert!(attached.contains(&"get_history_role-s3-read"));

    let role_resource = manifest
        .resource(ResourceType::Role, "get_history_role-role")
        .unwrap();
    let trust: PolicyDocument =
        serde_json::from_str(role_resource.input_str("assumeRolePolicy").unwrap()).unwrap();
    assert_eq!(trust.statement[0].action.actions(), vec!["sts:AssumeRole"]);
    assert_eq!(
        trust.statement[0].principal.as_ref().unwrap().service,
        "lambda.amazonaws.com"
    );
}

#[tokio::test]
async fn test_every_bucket_policy_is_scoped_to_objects() {
    let mut stack = Stack::new("dev");
    let logs = lambda_logs_policy(&mut stack, "shared-lambda-logs").unwrap();
    let history = Bucket::new(&mut stack, "bus-time-travel").unwrap();
    let archive = Bucket::new(&mut stack, "bus-archive").unwrap();
    read_from_bucket_role(&mut stack, "reader", &history, &logs).unwrap();
    write_to_bucket_role(&mut stack, "recorder", &archive, &logs).unwrap();

    let manifest = stack
        .synthesize(&context(), NamingStrategy::Suffixed)
        .await
        .unwrap();

    for (policy, bucket, action) in [
        ("reader-s3-read", "bus-time-travel", "s3:GetObject"),
        ("recorder-s3-write", "bus-archive", "s3:PutObject"),
    ] {
        let bucket_arn = manifest
            .resource(ResourceType::Bucket, bucket)
            .and_then(|b| b.output("arn"))
            .unwrap()
            .to_string();
        let document = document(&manifest, policy);
        assert_eq!(document.statement[0].action.actions(), vec![action]);
        assert_eq!(
            document.statement[0].resource,
            Some(format!("{bucket_arn}/*"))
        );
    }

    // Every role carries the one shared log policy.
    let logs_urn = logs.urn;
    for role in manifest.of_type(ResourceType::Role) {
        let policies = manifest.policies_of(&role.urn);
        assert_eq!(policies.len(), 2, "{}", role.name);
        assert!(policies.iter().any(|p| p.urn == logs_urn));
    }
    assert_eq!(
        manifest
            .of_type(ResourceType::Policy)
            .filter(|p| p.name == "shared-lambda-logs")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_deployment_manifest() {
    let artifact = TempDir::new().unwrap();
    std::fs::write(artifact.path().join("bootstrap"), b"binary").unwrap();

    let mut stack = Stack::new("prod");
    let deployment = deploy(
        &mut stack,
        &DeploymentConfig {
            artifact_dir: artifact.path().to_path_buf(),
            ..DeploymentConfig::default()
        },
    )
    .unwrap();

    let manifest = stack
        .synthesize(&context(), NamingStrategy::Exact)
        .await
        .unwrap();
    assert_eq!(manifest.resources.len(), 7);

    let functions: Vec<_> = manifest.of_type(ResourceType::Function).collect();
    assert_eq!(functions.len(), 1);
    let function = functions[0];

    // Exactly one role reference: the reader role.
    let roles: Vec<_> = function
        .depends_on
        .iter()
        .filter(|urn| manifest.of_type(ResourceType::Role).any(|r| &r.urn == *urn))
        .collect();
    assert_eq!(roles, vec![&deployment.reader_role.urn]);
    let role = manifest
        .resource(ResourceType::Role, "get_history_role-role")
        .unwrap();
    assert_eq!(function.input_str("role"), role.output("arn"));

    // The role is complete before the function consumes it.
    for attachment in manifest.attachments_of(&deployment.reader_role.urn) {
        assert!(function.depends_on(&attachment.urn));
    }

    // Manifest order respects every dependency.
    for (position, resource) in manifest.resources.iter().enumerate() {
        for dependency in &resource.depends_on {
            let earlier = manifest
                .resources
                .iter()
                .position(|r| &r.urn == dependency)
                .unwrap();
            assert!(earlier < position);
        }
    }

    let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
    assert_eq!(json["stack"], "prod");
    assert_eq!(json["context"]["account"], "123456789012");
}
