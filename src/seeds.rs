//! Built-in mission set so scoring works without a configured mission asset.

use crate::domain::{Mission, MissionType, Points, SubMission};

fn switch(options: &[&str]) -> MissionType {
  MissionType::Switch { options: options.iter().map(|s| s.to_string()).collect() }
}

/// Sample season: enough variety to exercise every scoring mode.
pub fn seed_missions() -> Vec<Mission> {
  vec![
    Mission {
      id: "M00".into(),
      name: "Bônus de inspeção de equipamento".into(),
      kind: switch(&[]),
      points: Points::Flat(20),
      submissions: vec![],
    },
    Mission {
      id: "M01".into(),
      name: "Projeto inovador".into(),
      kind: switch(&[]),
      points: Points::Flat(20),
      submissions: vec![SubMission {
        id: Some("M01b".into()),
        name: "Projeto tocando a área alvo".into(),
        kind: switch(&[]),
        points: Points::Flat(10),
      }],
    },
    Mission {
      id: "M02".into(),
      name: "Painéis solares".into(),
      kind: MissionType::Range { start: 0, end: 4 },
      points: Points::Flat(5),
      submissions: vec![],
    },
    Mission {
      id: "M03".into(),
      name: "Entrega da unidade".into(),
      kind: switch(&["Nenhuma", "Parcial", "Completa"]),
      points: Points::Scale(vec![0, 10, 20]),
      submissions: vec![],
    },
    Mission {
      id: "M04".into(),
      name: "Tanques de água".into(),
      kind: MissionType::Range { start: 0, end: 3 },
      points: Points::Scale(vec![0, 10, 20, 30]),
      submissions: vec![SubMission {
        id: None,
        name: "Tanque no reservatório".into(),
        kind: switch(&[]),
        points: Points::Flat(5),
      }],
    },
    Mission {
      id: "M15".into(),
      name: "Fichas de precisão".into(),
      kind: MissionType::Range { start: 0, end: 6 },
      points: Points::Scale(vec![0, 10, 15, 25, 35, 50, 50]),
      submissions: vec![],
    },
  ]
}
