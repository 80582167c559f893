//! Response shaping for list operations.
//!
//! Raw list payloads are large and flat; the summarizer does better with
//! counts and groupings computed up front.

use serde_json::{Map, Value, json};

/// Reshapes a successful payload for one operation
pub type PostProcessor = fn(&Map<String, Value>, Value) -> Value;

/// The post-processor registered for an operation, if any
pub fn for_operation(name: &str) -> Option<PostProcessor> {
    match name {
        "list_deployments" => Some(list_deployments),
        "get_deployment_pods" => Some(deployment_pods),
        "list_namespaces" => Some(list_namespaces),
        "get_namespace_summary" => Some(namespace_summary),
        _ => None,
    }
}

fn items(data: &Value) -> &[Value] {
    data.as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn count(item: &Value, key: &str) -> u64 {
    item.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn flag(item: &Value, key: &str) -> bool {
    item.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Groups deployments by namespace with a `ready/desired` status
pub fn list_deployments(params: &Map<String, Value>, data: Value) -> Value {
    let deployments = items(&data);
    let mut by_namespace = Map::new();

    for d in deployments {
        let namespace = d
            .get("namespace")
            .and_then(Value::as_str)
            .unwrap_or("unknown-namespace");
        let replicas = d.get("replicas").and_then(Value::as_u64).unwrap_or(1);
        let entry = json!({
            "name": d.get("name"),
            "type": d.get("type"),
            "status": format!("{}/{}", count(d, "ready_replicas"), replicas),
            "ready": flag(d, "available"),
        });
        if let Value::Array(list) = by_namespace
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            list.push(entry);
        }
    }

    let total = deployments.len();
    let ready = deployments.iter().filter(|d| flag(d, "available")).count();
    json!({
        "status": "success",
        "cluster_id": params.get("cluster_id"),
        "total_resources": total,
        "ready_resources": ready,
        "summary": by_namespace,
        "message": format!("Found {} resources, {} of them ready.", total, ready),
    })
}

/// Pod counts (total, running, online) of one deployment
pub fn deployment_pods(params: &Map<String, Value>, data: Value) -> Value {
    let pods = items(&data);
    let total = pods.len();
    let online = pods.iter().filter(|p| flag(p, "is_online")).count();
    let running = pods
        .iter()
        .filter(|p| p.get("phase").and_then(Value::as_str) == Some("Running"))
        .count();
    let name = params
        .get("deployment_name")
        .and_then(Value::as_str)
        .unwrap_or("deployment");

    json!({
        "status": "success",
        "deployment_name": name,
        "namespace": params.get("namespace_name"),
        "cluster_id": params.get("cluster_id"),
        "pod_count": total,
        "online_pods": online,
        "running_pods": running,
        "pods": data,
        "message": format!("Found {} pods in '{}', {} running.", total, name, running),
    })
}

pub fn list_namespaces(params: &Map<String, Value>, data: Value) -> Value {
    let total = items(&data).len();
    json!({
        "status": "success",
        "cluster_id": params.get("cluster_id"),
        "namespace_count": total,
        "namespaces": data,
        "message": format!("Found {} namespaces.", total),
    })
}

/// Pod totals across namespaces, the five busiest and the troubled ones
pub fn namespace_summary(params: &Map<String, Value>, data: Value) -> Value {
    let namespaces = items(&data);
    let sum = |key: &str| namespaces.iter().map(|ns| count(ns, key)).sum::<u64>();
    let total_pods = sum("total_pod_count");

    let mut busiest: Vec<&Value> = namespaces.iter().collect();
    busiest.sort_by_key(|ns| std::cmp::Reverse(count(ns, "running_pod_count")));
    busiest.truncate(5);

    let problematic: Vec<&Value> = namespaces
        .iter()
        .filter(|ns| count(ns, "failed_pod_count") > 0 || count(ns, "pending_pod_count") > 0)
        .collect();

    json!({
        "status": "success",
        "cluster_id": params.get("cluster_id"),
        "summary": {
            "total_namespaces": namespaces.len(),
            "total_pods": total_pods,
            "running_pods": sum("running_pod_count"),
            "failed_pods": sum("failed_pod_count"),
            "pending_pods": sum("pending_pod_count"),
        },
        "top_active_namespaces": busiest,
        "problematic_namespaces": problematic,
        "all_namespaces": &data,
        "message": format!("The cluster has {} namespaces and {} pods.", namespaces.len(), total_pods),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_deployments_grouped_by_namespace() {
        let data = json!([
            {"name": "nginx", "namespace": "default", "type": "Deployment", "replicas": 3, "ready_replicas": 3, "available": true},
            {"name": "api", "namespace": "default", "type": "Deployment", "replicas": 2, "ready_replicas": 1, "available": false},
            {"name": "coredns", "namespace": "kube-system", "type": "Deployment", "ready_replicas": 1, "available": true},
            {"name": "orphan"}
        ]);

        let out = list_deployments(&params(json!({"cluster_id": "c-1"})), data);

        assert_eq!(out["total_resources"], 4);
        assert_eq!(out["ready_resources"], 2);
        assert_eq!(out["cluster_id"], "c-1");
        assert_eq!(out["summary"]["default"][0]["status"], "3/3");
        assert_eq!(out["summary"]["default"][1]["ready"], false);
        assert_eq!(out["summary"]["kube-system"][0]["status"], "1/1");
        assert_eq!(out["summary"]["unknown-namespace"][0]["status"], "0/1");
    }

    #[test]
    fn test_empty_deployment_list() {
        let out = list_deployments(&Map::new(), json!([]));
        assert_eq!(out["total_resources"], 0);
        assert_eq!(out["summary"], json!({}));
    }

    #[test]
    fn test_pod_counts() {
        let data = json!([
            {"name": "a", "phase": "Running", "is_online": true},
            {"name": "b", "phase": "Pending", "is_online": false},
            {"name": "c", "phase": "Running", "is_online": false}
        ]);
        let out = deployment_pods(
            &params(json!({"deployment_name": "nginx", "namespace_name": "default"})),
            data,
        );
        assert_eq!(out["pod_count"], 3);
        assert_eq!(out["running_pods"], 2);
        assert_eq!(out["online_pods"], 1);
        assert_eq!(out["namespace"], "default");
    }

    #[test]
    fn test_namespace_summary_totals_and_rankings() {
        let data = json!([
            {"name": "a", "total_pod_count": 4, "running_pod_count": 4},
            {"name": "b", "total_pod_count": 3, "running_pod_count": 1, "failed_pod_count": 2},
            {"name": "c", "total_pod_count": 9, "running_pod_count": 8, "pending_pod_count": 1},
            {"name": "d"}, {"name": "e"}, {"name": "f"}
        ]);
        let out = namespace_summary(&Map::new(), data);

        assert_eq!(out["summary"]["total_namespaces"], 6);
        assert_eq!(out["summary"]["total_pods"], 16);
        assert_eq!(out["summary"]["failed_pods"], 2);
        assert_eq!(out["top_active_namespaces"].as_array().unwrap().len(), 5);
        assert_eq!(out["top_active_namespaces"][0]["name"], "c");
        let troubled: Vec<&str> = out["problematic_namespaces"]
            .as_array()
            .unwrap()
            .iter()
            .map(|ns| ns["name"].as_str().unwrap())
            .collect();
        assert_eq!(troubled, vec!["b", "c"]);
    }

    #[test]
    fn test_registered_operations() {
        assert!(for_operation("list_deployments").is_some());
        assert!(for_operation("get_namespace_summary").is_some());
        assert!(for_operation("scale_deployment").is_none());
    }
}
