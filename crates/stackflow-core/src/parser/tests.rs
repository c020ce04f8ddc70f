use super::*;
use crate::model::BuildStrategy;

const SAMPLE: &str = r#"
app "my-api"
strategy "managed"

container {
    port 8080
    image "public.ecr.aws/acme/api"
    build-args {
        NODE_ENV "production"
    }
}

stage "prod" {
    aws account="123456789012" region="eu-west-1" account-name="acme-prod"
    vpc id="vpc-0abc"
    route53 enable=#true domain="example.com" hostname="api"
    acm create=#false arn="arn:aws:acm:eu-west-1:123456789012:certificate/abc"
    secret "arn:aws:secretsmanager:eu-west-1:123456789012:secret:db-AbCdEf" {
        password "DB_PASSWORD"
        username "DB_USER"
    }
    secret "arn:aws:secretsmanager:eu-west-1:123456789012:secret:api-XyZ" {
        token "API_TOKEN"
    }
    task desired-count=2 cpu=512 memory=1024 spot=#true
    autoscaling min=2 max=6 cpu-target=70
    load-balancer healthcheck-path="/health"
    alarms {
        cpu threshold=70 evaluation-periods=3 datapoints-to-alarm=2
        memory threshold=82.5
    }
    policy {
        resources "arn:aws:s3:::acme-uploads/*"
        actions "s3:GetObject" "s3:PutObject"
    }
    tag "CostCenter" "platform"
}

stage "dev" {
    aws account="210987654321" region="eu-west-1"
    vpc name="dev-vpc"
    container {
        port 3000
    }
}
"#;

#[test]
fn test_parse_global_section() {
    let config = parse_kdl_string(SAMPLE).unwrap();

    assert_eq!(config.app, "my-api");
    assert_eq!(config.strategy, BuildStrategy::Managed);
    assert_eq!(config.container.port, Some(8080));
    assert_eq!(
        config.container.image.as_ref().unwrap().uri,
        "public.ecr.aws/acme/api"
    );
    assert_eq!(config.container.build_args["NODE_ENV"], "production");
    assert_eq!(config.stages.len(), 2);
}

#[test]
fn test_parse_full_stage() {
    let config = parse_kdl_string(SAMPLE).unwrap();
    let prod = config.stage("prod").unwrap();

    assert_eq!(prod.aws.account, "123456789012");
    assert_eq!(prod.aws.account_name.as_deref(), Some("acme-prod"));
    assert_eq!(prod.vpc.id.as_deref(), Some("vpc-0abc"));
    assert!(prod.vpc.name.is_none());

    assert!(prod.dns.enable);
    assert_eq!(prod.dns.domain, "example.com");
    assert_eq!(prod.dns.hostname, "api");

    let cert = prod.certificate.as_ref().unwrap();
    assert!(!cert.create);
    assert_eq!(
        cert.arn(),
        Some("arn:aws:acm:eu-west-1:123456789012:certificate/abc")
    );

    assert_eq!(prod.secrets.len(), 2);
    assert_eq!(prod.secrets[0].variables["password"], "DB_PASSWORD");
    assert_eq!(prod.secrets[0].variables["username"], "DB_USER");
    assert_eq!(prod.secrets[1].variables["token"], "API_TOKEN");

    assert_eq!(prod.task.desired_count, Some(2));
    assert_eq!(prod.task.cpu, Some(512));
    assert_eq!(prod.task.memory, Some(1024));
    assert!(prod.task.spot);

    let scaling = prod.autoscaling.as_ref().unwrap();
    assert_eq!(scaling.min_capacity, Some(2));
    assert_eq!(scaling.max_capacity, Some(6));
    assert_eq!(scaling.cpu_target, Some(70));

    assert_eq!(
        prod.load_balancer.as_ref().unwrap().healthcheck_path.as_deref(),
        Some("/health")
    );

    let alarms = prod.alarms.as_ref().unwrap();
    let cpu = alarms.cpu.as_ref().unwrap();
    assert_eq!(cpu.threshold, Some(70.0));
    assert_eq!(cpu.evaluation_periods, Some(3));
    assert_eq!(cpu.datapoints_to_alarm, Some(2));
    assert_eq!(alarms.memory.as_ref().unwrap().threshold, Some(82.5));
    assert!(alarms.task_count.is_none());

    assert_eq!(prod.extra_policies.len(), 1);
    assert_eq!(prod.extra_policies[0].actions.len(), 2);

    let tag = prod.custom_tag.as_ref().unwrap();
    assert_eq!(tag.key, "CostCenter");
    assert_eq!(tag.value, "platform");
}

#[test]
fn test_parse_minimal_stage() {
    let config = parse_kdl_string(SAMPLE).unwrap();
    let dev = config.stage("dev").unwrap();

    assert_eq!(dev.vpc.name.as_deref(), Some("dev-vpc"));
    assert!(!dev.dns.enable);
    assert!(dev.certificate.is_none());
    assert!(dev.secrets.is_empty());
    assert_eq!(dev.task.desired_count, None);
    assert_eq!(dev.container.as_ref().unwrap().port, Some(3000));
}

#[test]
fn test_parse_explicit_strategy() {
    let kdl = r#"
        app "svc"
        strategy "explicit"
    "#;
    let config = parse_kdl_string(kdl).unwrap();
    assert_eq!(config.strategy, BuildStrategy::Explicit);
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let kdl = r#"
        app "svc"
        strategy "blue-green"
    "#;
    let result = parse_kdl_string(kdl);
    assert!(matches!(result, Err(StackError::ConfigValidation(_))));
}

#[test]
fn test_missing_app_is_rejected() {
    let kdl = r#"stage "dev" {}"#;
    assert!(matches!(
        parse_kdl_string(kdl),
        Err(StackError::ConfigValidation(_))
    ));
}

#[test]
fn test_duplicate_stage_is_rejected() {
    let kdl = r#"
        app "svc"
        stage "dev" {}
        stage "dev" {}
    "#;
    assert!(matches!(
        parse_kdl_string(kdl),
        Err(StackError::ConfigValidation(_))
    ));
}

#[test]
fn test_negative_cpu_is_rejected() {
    let kdl = r#"
        app "svc"
        stage "dev" {
            task cpu=-256
        }
    "#;
    assert!(matches!(
        parse_kdl_string(kdl),
        Err(StackError::ConfigValidation(_))
    ));
}

#[test]
fn test_unknown_alarm_metric_is_rejected() {
    let kdl = r#"
        app "svc"
        stage "dev" {
            alarms {
                disk threshold=90
            }
        }
    "#;
    assert!(parse_kdl_string(kdl).is_err());
}

#[test]
fn test_tag_with_properties() {
    let kdl = r#"
        app "svc"
        stage "dev" {
            tag key="Team" value="payments"
        }
    "#;
    let config = parse_kdl_string(kdl).unwrap();
    let tag = config.stage("dev").unwrap().custom_tag.clone().unwrap();
    assert_eq!(tag.key, "Team");
    assert_eq!(tag.value, "payments");
}

#[test]
fn test_invalid_kdl_syntax() {
    let result = parse_kdl_string("app \"svc\" {");
    assert!(matches!(result, Err(StackError::KdlParse(_))));
}

#[test]
fn test_parse_cdk_json_layout() {
    let json = r#"{
        "name": "my-api",
        "container": {
            "port": 8080,
            "buildArgs": { "NODE_ENV": "production" },
            "image": { "uri": "public.ecr.aws/acme/api" }
        },
        "stages": {
            "prod": {
                "aws": { "account_name": "acme", "account": "123456789012", "region": "eu-west-1" },
                "vpc": { "name": "acme-VPC" },
                "route53": { "enable": true, "domain": "example.com", "hostname": "api" },
                "acm": { "create": false, "arn": "" },
                "secretsManager": [
                    { "arn": "arn:aws:secretsmanager:eu-west-1:1:secret:db", "variables": { "password": "DB_PASSWORD" } }
                ],
                "task": { "desiredCount": 2, "cpu": 512, "memoryLimitMiB": 1024, "spot": false },
                "autoscaling": { "minCapacity": 1, "maxCapacity": 3, "cpuTargetUtilizationPercent": 75 },
                "loadBalancer": { "healthcheckPath": "/ping" },
                "cloudWatchAlarm": { "cpu": { "alarmThreshold": 65, "evaluationPeriods": 2 } },
                "extraPolicies": [ { "resources": ["*"], "actions": ["sqs:SendMessage"] } ],
                "customTags": { "key": "Owner", "value": "platform" }
            }
        }
    }"#;

    let config = parse_json_string(json).unwrap();
    assert_eq!(config.app, "my-api");
    assert_eq!(config.strategy, BuildStrategy::Managed);

    let prod = config.stage("prod").unwrap();
    assert_eq!(prod.aws.account_name.as_deref(), Some("acme"));
    assert_eq!(prod.vpc.name.as_deref(), Some("acme-VPC"));
    let cert = prod.certificate.as_ref().unwrap();
    assert!(!cert.create);
    assert!(cert.arn().is_none());
    assert_eq!(prod.secrets[0].variables["password"], "DB_PASSWORD");
    assert_eq!(prod.task.memory, Some(1024));
    assert_eq!(prod.autoscaling.as_ref().unwrap().cpu_target, Some(75));
    assert_eq!(
        prod.alarms.as_ref().unwrap().cpu.as_ref().unwrap().threshold,
        Some(65.0)
    );
    assert_eq!(prod.custom_tag.as_ref().unwrap().key, "Owner");
}

#[test]
fn test_load_config_file_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let kdl_path = dir.path().join("stack.kdl");
    std::fs::write(&kdl_path, "app \"from-kdl\"").unwrap();
    assert_eq!(load_config_file(&kdl_path).unwrap().app, "from-kdl");

    let json_path = dir.path().join("cdk.config.json");
    std::fs::write(&json_path, r#"{ "name": "from-json" }"#).unwrap();
    assert_eq!(load_config_file(&json_path).unwrap().app, "from-json");
}

#[test]
fn test_load_config_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_config_file(dir.path().join("missing.kdl"));
    assert!(matches!(result, Err(StackError::Io(_))));
}

#[test]
fn test_dns_and_certificate_defaults_match_across_formats() {
    let kdl = r#"
app "my-api"
stage "prod" {
    route53 domain="example.com" hostname="api"
    acm
}
"#;
    let json = r#"{
        "name": "my-api",
        "stages": {
            "prod": {
                "route53": { "domain": "example.com", "hostname": "api" },
                "acm": {}
            }
        }
    }"#;

    let from_kdl = parse_kdl_string(kdl).unwrap();
    let from_json = parse_json_string(json).unwrap();
    let kdl_stage = from_kdl.stage("prod").unwrap();
    let json_stage = from_json.stage("prod").unwrap();

    assert!(!kdl_stage.dns.enable);
    assert_eq!(kdl_stage.dns, json_stage.dns);
    assert!(kdl_stage.certificate.as_ref().unwrap().create);
    assert_eq!(kdl_stage.certificate, json_stage.certificate);
}
