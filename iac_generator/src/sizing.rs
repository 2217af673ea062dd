use deploy_defs::HintLevel;

// Perf hint -> resource sizing, applied per runtime family. The managed
// service takes provider-style strings, the cluster takes cpu units and
// memory MB.

pub fn service_cpu(perf: HintLevel) -> &'static str {
    match perf {
        HintLevel::Low | HintLevel::Standard => "0.25 vCPU",
        HintLevel::High => "1 vCPU",
    }
}

pub fn service_memory(perf: HintLevel) -> &'static str {
    match perf {
        HintLevel::Low | HintLevel::Standard => "0.5 GB",
        HintLevel::High => "2 GB",
    }
}

pub fn cluster_cpu(perf: HintLevel) -> u64 {
    match perf {
        HintLevel::Low => 256,
        HintLevel::Standard => 512,
        HintLevel::High => 1024,
    }
}

pub fn cluster_memory(perf: HintLevel) -> u64 {
    match perf {
        HintLevel::Low => 512,
        HintLevel::Standard => 1024,
        HintLevel::High => 2048,
    }
}

/// Cost hint only affects the database tier: smallest class when cost is
/// low, the next tier otherwise.
pub fn db_instance_class(cost: HintLevel) -> &'static str {
    match cost {
        HintLevel::Low => "db.t3.micro",
        HintLevel::Standard | HintLevel::High => "db.t3.small",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sizing_table() {
        assert_eq!(service_cpu(HintLevel::Standard), "0.25 vCPU");
        assert_eq!(service_memory(HintLevel::High), "2 GB");
        assert_eq!(cluster_cpu(HintLevel::Low), 256);
        assert_eq!(cluster_cpu(HintLevel::Standard), 512);
        assert_eq!(cluster_memory(HintLevel::High), 2048);
    }

    #[test]
    fn test_db_class_follows_cost_hint() {
        assert_eq!(db_instance_class(HintLevel::Low), "db.t3.micro");
        assert_eq!(db_instance_class(HintLevel::Standard), "db.t3.small");
        assert_eq!(db_instance_class(HintLevel::High), "db.t3.small");
    }
}
