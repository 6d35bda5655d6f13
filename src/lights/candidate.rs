/// Whether a node follows the light-bearing naming convention.
pub fn is_light_candidate(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix)
}

/// Derive the light name from its parent node's name.
///
/// `ordinal` is the position of the descriptor in the node's list; every light
/// after the first gets a numbered suffix so names stay distinct.
pub fn light_name(parent_name: &str, pattern: &str, replacement: &str, ordinal: usize) -> String {
    let base = if pattern.is_empty() {
        parent_name.to_string()
    } else {
        parent_name.replace(pattern, replacement)
    };
    if ordinal == 0 {
        base
    } else {
        format!("{base}.{ordinal:03}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_CANDIDATE_PREFIX;

    #[test]
    fn petal_layers_are_candidates() {
        assert!(is_light_candidate("Petal_Layer_03_Node", DEFAULT_CANDIDATE_PREFIX));
        assert!(is_light_candidate("Petal_Layer", DEFAULT_CANDIDATE_PREFIX));
    }

    #[test]
    fn other_nodes_are_not() {
        assert!(!is_light_candidate("Stem_Node", DEFAULT_CANDIDATE_PREFIX));
        assert!(!is_light_candidate("petal_layer_01", DEFAULT_CANDIDATE_PREFIX));
        assert!(!is_light_candidate("Node_Petal_Layer", DEFAULT_CANDIDATE_PREFIX));
        assert!(!is_light_candidate("", DEFAULT_CANDIDATE_PREFIX));
    }

    #[test]
    fn node_becomes_light() {
        assert_eq!(light_name("Petal_Layer_Node_2", "Node", "Light", 0), "Petal_Layer_Light_2");
    }

    #[test]
    fn name_without_pattern_is_unchanged() {
        assert_eq!(light_name("Petal_Layer_2", "Node", "Light", 0), "Petal_Layer_2");
    }

    #[test]
    fn every_occurrence_is_replaced() {
        assert_eq!(light_name("Node_Node", "Node", "Light", 0), "Light_Light");
    }

    #[test]
    fn later_lights_are_numbered() {
        assert_eq!(
            light_name("Petal_Layer_Node_0", "Node", "Light", 1),
            "Petal_Layer_Light_0.001"
        );
        assert_eq!(
            light_name("Petal_Layer_Node_0", "Node", "Light", 12),
            "Petal_Layer_Light_0.012"
        );
    }
}
