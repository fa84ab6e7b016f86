use std::fs;
use std::rc::Rc;

use pdmflow::{ClockDomain, Package, PackageError, Signal, Simulator};
use pdmflow_std::*;

fn collect_period(sim: &mut Simulator, pdm: &Pdm) -> Vec<u64> {
    let domain = pdm.domain().clone();
    (0..pdm.period())
        .map(|_| {
            sim.tick(&domain);
            pdm.out().get()
        })
        .collect()
}

#[test]
fn zero_duty_never_switches() {
    let pdm = Rc::new(Pdm::new(PdmConfig::new().bits(6)).unwrap());
    let mut sim = Simulator::new();
    sim.add(pdm.clone());

    for _ in 0..4 {
        assert!(collect_period(&mut sim, &pdm).iter().all(|&out| out == 0));
    }
}

#[test]
fn density_over_every_period() {
    let pdm = Rc::new(Pdm::new(PdmConfig::new().bits(4)).unwrap());
    let mut sim = Simulator::new();
    sim.add(pdm.clone());

    for duty in 0..16 {
        pdm.set_duty(duty).unwrap();
        // The duty register lives in the generator domain, so the next edge already compares against it.
        let high = collect_period(&mut sim, &pdm).into_iter().sum::<u64>();
        assert_eq!(high, duty);
    }
}

#[test]
fn max_duty_has_single_low_cycle_per_period() {
    let pdm = Rc::new(Pdm::new(PdmConfig::new().bits(3).default_duty(7)).unwrap());
    let mut sim = Simulator::new();
    sim.add(pdm.clone());

    let outputs = collect_period(&mut sim, &pdm);
    assert_eq!(outputs, vec![1, 1, 1, 1, 1, 1, 1, 0]);
}

#[test]
fn counter_wraps_around() {
    let pdm = Pdm::new(PdmConfig::new().bits(5)).unwrap();
    pdm.counter().set(31);
    pdm.tick();
    assert_eq!(pdm.counter().get(), 0);
}

#[test]
fn shared_counter_drives_several_channels() {
    let domain = ClockDomain::sys();
    let counter = Rc::new(Counter::new("shared_counter", 10, domain.clone()));
    let duties = [0, 1, 5, 7];
    let channels = duties
        .iter()
        .enumerate()
        .map(|(i, &duty)| {
            let level = Signal::new(format!("level{}", i), 3);
            level.set(duty);
            Rc::new(
                Pdm::new(PdmConfig::new().name(format!("pdm{}", i)).duty(level).counter(counter.value().clone())).unwrap(),
            )
        })
        .collect::<Vec<_>>();

    let mut sim = Simulator::new();
    sim.add(counter.clone());
    for channel in &channels {
        assert!(!channel.owns_counter());
        sim.add(channel.clone());
    }

    let mut high = vec![0; channels.len()];
    for _ in 0..64 {
        let value = counter.value().get();
        sim.tick(&domain);
        assert_eq!(counter.value().get(), (value + 1) % 1024);
        for (i, channel) in channels.iter().enumerate() {
            // Only the low 3 bits of the shared counter take part in the comparison.
            assert_eq!(channel.out().get(), u64::from(pdm_output(value, duties[i], 3)));
            high[i] += channel.out().get();
        }
    }
    assert_eq!(high, vec![0, 8, 40, 56]);
}

#[test]
fn external_output_is_driven() {
    let led = Signal::bool("led");
    let pdm = Pdm::new(PdmConfig::new().bits(1).default_duty(1).out(led.clone())).unwrap();
    pdm.tick();
    assert_eq!(led.get(), 1);
    pdm.tick();
    assert_eq!(led.get(), 0);
}

#[test]
fn same_domain_csr_is_visible_immediately() {
    let pdm = Rc::new(Pdm::new(PdmConfig::new().bits(3).with_csr(true)).unwrap());
    let mut sim = Simulator::new();
    sim.add(pdm.clone());

    pdm.csr().unwrap().write(3);
    assert_eq!(pdm.effective_duty(), 3);
    assert_eq!(collect_period(&mut sim, &pdm), vec![1, 0, 1, 0, 1, 0, 0, 0]);
}

#[test]
fn cross_domain_csr_settles_within_stage_count() {
    let sys = ClockDomain::sys();
    let pdm_domain = ClockDomain::new("pdm");
    let pdm = Rc::new(Pdm::new(PdmConfig::new().bits(2).with_csr(true).clock_domain(pdm_domain.clone())).unwrap());
    let mut sim = Simulator::new();
    sim.add(pdm.clone());
    assert_eq!(pdm.sync_stages(), MULTIREG_STAGES);

    // Let the CSR domain run for a while: nothing in the generator domain may change.
    pdm.csr().unwrap().write(3);
    sim.run(&sys, 5);
    assert_eq!(pdm.effective_duty(), 0);
    assert_eq!(pdm.out().get(), 0);

    // The old value stays visible for at least one edge, the new one after `MULTIREG_STAGES` edges.
    let mut seen = vec![];
    for _ in 0..MULTIREG_STAGES + 1 {
        seen.push(pdm.effective_duty());
        sim.tick(&pdm_domain);
    }
    seen.push(pdm.effective_duty());
    assert_eq!(seen, vec![0, 0, 3, 3]);

    // Output lags the synchronized duty by one more register.
    let counter = pdm.counter().get();
    sim.tick(&pdm_domain);
    assert_eq!(pdm.out().get(), u64::from(pdm_output(counter, 3, 2)));
}

#[test]
fn cross_domain_output_window() {
    let pdm_domain = ClockDomain::new("pdm");
    let pdm = Rc::new(
        Pdm::new(PdmConfig::new().bits(2).default_duty(0).with_csr(true).csr_domain("bus").clock_domain(pdm_domain.clone()))
            .unwrap(),
    );
    let mut sim = Simulator::new();
    sim.add(pdm.clone());

    // Counter sequence 0, 1, 2, 3 reversed is 0, 2, 1, 3: with duty 3 every cycle but the last is high.
    pdm.csr().unwrap().write(3);
    let outputs = (0..8)
        .map(|_| {
            sim.tick(&pdm_domain);
            pdm.out().get()
        })
        .collect::<Vec<_>>();
    assert_eq!(outputs, vec![0, 0, 1, 0, 1, 1, 1, 0]);
}

#[test]
fn package_writes_one_file_per_module() {
    let dir = std::env::temp_dir().join(format!("pdmflow-package-{}", std::process::id()));
    let mut package = Package::default();
    package.add(Rc::new(Pdm::new(PdmConfig::new().name("pdm_a")).unwrap()));
    package.add(Rc::new(Pdm::new(PdmConfig::new().name("pdm_b").with_csr(true).clock_domain("pdm")).unwrap()));
    package.gen_vir(&dir).unwrap();

    let a = fs::read_to_string(dir.join("pdm_a.v")).unwrap();
    let b = fs::read_to_string(dir.join("pdm_b.v")).unwrap();
    assert!(a.starts_with("`timescale 1ns / 1ps\n\nmodule pdm_a\n"));
    assert!(b.contains("duty_multireg1"));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn package_rejects_duplicated_names() {
    let mut package = Package::default();
    package.add(Rc::new(Pdm::new(PdmConfig::new()).unwrap()));
    package.add(Rc::new(Pdm::new(PdmConfig::new().bits(4)).unwrap()));
    let dir = std::env::temp_dir().join("pdmflow-package-unused");
    assert!(matches!(package.gen_vir(&dir), Err(PackageError::DuplicatedName { name }) if name == "pdm"));
}
