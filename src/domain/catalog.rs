// Chart catalog - the fixed battery of hydrostatic test charts
use super::chart::{ChartKind, ChartSpec, DerivedTrace, RowSelection};
use super::mode::Mode;
use super::outlier::{
    COLD_TEMPERATURE_GRADIENT_BOUND, HOT_TEMPERATURE_GRADIENT_BOUND, PRESSURE_GRADIENT_BOUND,
    SegregationThreshold,
};

const PRESSURE: &str = "Pression (bar)";
const TEMPERATURE: &str = "Température (°C)";
const TEMPERATURE_GRADIENT: &str = "Température (°C/h)";
const FLUID_TITLE: &str = "Suivi des températures fluide pendant l'EHP";

/// Discharge pressure below which the charging pump is considered idle.
const DISCHARGE_ACTIVE_SILL: f64 = 4.0;

/// Build every chart spec for a run.
pub fn catalog(mode: Mode, segregation: SegregationThreshold) -> Vec<ChartSpec> {
    ChartKind::ALL
        .iter()
        .map(|kind| kind.spec(mode, segregation))
        .collect()
}

fn labels(pairs: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .map(|(raw, label)| (*raw, label.to_string()))
        .collect()
}

impl ChartKind {
    pub fn output_name(&self) -> &'static str {
        match self {
            ChartKind::RcpPressure => "rcp",
            ChartKind::DischargePressure => "pression_refoulement_mule",
            ChartKind::DischargePressureDetail => "pression_refoulement_mule_detail",
            ChartKind::VesselBottomTemperature => "temperature_gros_composants_fond_de_cuve",
            ChartKind::FlangeTemperature => "temperature_gros_composants_brides_JEP",
            ChartKind::SteamGeneratorTemperature => "temperature_gros_composants_gv",
            ChartKind::PressureGradient => "gradients_de_pression",
            ChartKind::MeanTemperature => "Tmoy",
            ChartKind::MeanTemperatureGradient => "Tgrad",
            ChartKind::FluidTemperature1 => "Tfluide1",
            ChartKind::FluidTemperature2 => "Tfluide2",
            ChartKind::FluidTemperature3 => "Tfluide3",
            ChartKind::MetalGradient1 => "Tmetal1",
            ChartKind::MetalGradient2 => "Tmetal2",
            ChartKind::MetalGradient3 => "Tmetal3",
            ChartKind::ProofPressure => "P_primaire_epreuve",
            ChartKind::ProofPressurePlateau => "P_primaire_palier",
        }
    }

    pub fn spec(&self, mode: Mode, segregation: SegregationThreshold) -> ChartSpec {
        let four_loops = mode.has_fourth_loop();
        let base = |title: &str, y_label: &'static str, columns: Vec<&'static str>| ChartSpec {
            output_name: self.output_name(),
            title: title.to_string(),
            y_label,
            columns,
            rows: RowSelection::All,
            derived: Vec::new(),
            labels: Vec::new(),
        };

        match self {
            ChartKind::RcpPressure => base(
                "Evolution de la pression RCP pendant l'EHP",
                PRESSURE,
                vec!["EHP001MP", "EHP002MP"],
            ),

            ChartKind::DischargePressure | ChartKind::DischargePressureDetail => {
                let bundle = mode.thresholds();
                let pump = bundle.pump_tag;
                let mut title =
                    format!("Evolution de la pression de refoulement de la pompe {}", pump);
                let mut rows = RowSelection::All;
                if *self == ChartKind::DischargePressureDetail {
                    title.push_str(" pendant l'épreuve");
                    rows = RowSelection::Above {
                        column: "EHP003MP",
                        sill: DISCHARGE_ACTIVE_SILL,
                    };
                }

                ChartSpec {
                    rows,
                    derived: vec![
                        DerivedTrace::Constant {
                            key: "pressure_limit",
                            value: bundle.pressure_limit,
                        },
                        DerivedTrace::Constant {
                            key: "trip_threshold",
                            value: bundle.trip_threshold,
                        },
                        DerivedTrace::Constant {
                            key: "alarm_threshold",
                            value: bundle.alarm_threshold,
                        },
                    ],
                    labels: vec![
                        (
                            "pressure_limit",
                            format!("Pression limite EHP003MP: {}bars", bundle.pressure_limit),
                        ),
                        (
                            "trip_threshold",
                            format!("Seuil d'arrêt: {} {}bars", pump, bundle.trip_threshold),
                        ),
                        (
                            "alarm_threshold",
                            format!(
                                "Seuil d'alarme haute pression refoulement: {} {}bars",
                                pump, bundle.alarm_threshold
                            ),
                        ),
                    ],
                    ..base(&title, PRESSURE, vec!["EHP003MP"])
                }
            }

            ChartKind::VesselBottomTemperature => base(
                "Evolution de la temperature des gros composants - Fond de cuve",
                "Température °C",
                vec!["EHP001MT", "EHP002MT", "EHP003MT", "EHP011MT"],
            ),

            ChartKind::FlangeTemperature => ChartSpec {
                labels: labels(&[
                    ("EHP004MT", "EHP004MT - Bride de cuve"),
                    ("EHP005MT", "EHP005MT - Bride de couvercle"),
                    ("EHP006MT", "EHP006MT - JEP Pressu"),
                    ("EHP012MT", "EHP012MT - Bride de cuve"),
                    ("EHP013MT", "EHP013MT - Bride de couvercle"),
                    ("EHP014MT", "EHP014MT - JEP Pressu"),
                ]),
                ..base(
                    "Evolution de la temperature des gros composants",
                    "Température °C",
                    vec!["EHP004MT", "EHP005MT", "EHP006MT", "EHP012MT", "EHP013MT", "EHP014MT"],
                )
            },

            ChartKind::SteamGeneratorTemperature => {
                let (title, columns, pairs): (_, Vec<&'static str>, &[(&'static str, &str)]) =
                    if four_loops {
                        (
                            "Evolution de la temperature des gros composants - GV",
                            vec![
                                "EHP007MT", "EHP008MT", "EHP009MT", "EHP010MT", "EHP015MT",
                                "EHP016MT", "EHP017MT", "EHP018MT",
                            ],
                            &[
                                ("EHP007MT", "EHP007MT - GV1"),
                                ("EHP008MT", "EHP008MT - GV2"),
                                ("EHP009MT", "EHP009MT - GV3"),
                                ("EHP010MT", "EHP010MT - GV4"),
                                ("EHP015MT", "EHP015MT - GV1"),
                                ("EHP016MT", "EHP016MT - GV2"),
                                ("EHP017MT", "EHP017MT - GV3"),
                                ("EHP018MT", "EHP018MT - GV4"),
                            ],
                        )
                    } else {
                        (
                            "Evolution de la temperature des gros composants - GVs",
                            vec![
                                "EHP007MT", "EHP008MT", "EHP009MT", "EHP015MT", "EHP016MT",
                                "EHP017MT",
                            ],
                            &[
                                ("EHP007MT", "EHP007MT - GV1"),
                                ("EHP008MT", "EHP008MT - GV2"),
                                ("EHP009MT", "EHP009MT - GV3"),
                                ("EHP015MT", "EHP015MT - GV1"),
                                ("EHP016MT", "EHP016MT - GV2"),
                                ("EHP017MT", "EHP017MT - GV3"),
                            ],
                        )
                    };
                ChartSpec {
                    labels: labels(pairs),
                    ..base(title, TEMPERATURE, columns)
                }
            }

            ChartKind::PressureGradient => ChartSpec {
                derived: vec![
                    DerivedTrace::Constant { key: "val_max_grad", value: PRESSURE_GRADIENT_BOUND },
                    DerivedTrace::Constant { key: "val_min_grad", value: -PRESSURE_GRADIENT_BOUND },
                ],
                labels: labels(&[
                    ("val_max_grad", "Valeur Max Gradient (+4 bar/min)"),
                    ("val_min_grad", "Valeur Min Gradient (-4 bar/min)"),
                ]),
                ..base(
                    "Gradients de Pression de l'EHP",
                    "Gradient de Pression (bar/min)",
                    vec!["EHP001MPGrad", "EHP002MPGrad"],
                )
            },

            ChartKind::MeanTemperature => {
                base("Suivi de la Tmoy de l'EHP", TEMPERATURE, vec!["TMOY"])
            }

            ChartKind::MeanTemperatureGradient => ChartSpec {
                derived: vec![
                    DerivedTrace::Banded {
                        key: "Tmoymax",
                        condition: "TMOY",
                        threshold: segregation.value(),
                        above: HOT_TEMPERATURE_GRADIENT_BOUND,
                        otherwise: COLD_TEMPERATURE_GRADIENT_BOUND,
                    },
                    DerivedTrace::Banded {
                        key: "Tmoymin",
                        condition: "TMOY",
                        threshold: segregation.value(),
                        above: -HOT_TEMPERATURE_GRADIENT_BOUND,
                        otherwise: -COLD_TEMPERATURE_GRADIENT_BOUND,
                    },
                ],
                labels: labels(&[
                    ("Tmoymin", "Tmoymin -14°C/h & -28°C/h"),
                    ("Tmoymax", "Tmoymax +14°C/h & +28°C/h"),
                ]),
                ..base("Suivi du gradient de Tmoy de l'EHP", TEMPERATURE_GRADIENT, vec!["TGRAD"])
            },

            // 1300 MW plants export their fluid probes under the 900 MW tag
            // slots; the labels restore the real tag names.
            ChartKind::FluidTemperature1 => ChartSpec {
                labels: if four_loops {
                    labels(&[("RCP010MT", "RCP014MT"), ("RCP028MT", "RCP100MT")])
                } else {
                    Vec::new()
                },
                ..base(FLUID_TITLE, TEMPERATURE, vec!["RCP009MT", "RCP010MT", "RCP028MT"])
            },

            ChartKind::FluidTemperature2 => ChartSpec {
                labels: if four_loops {
                    labels(&[
                        ("RCP029MT", "RCP104MT"),
                        ("RCP043MT", "RCP200MT"),
                        ("RCP044MT", "RCP204MT"),
                    ])
                } else {
                    Vec::new()
                },
                ..base(FLUID_TITLE, TEMPERATURE, vec!["RCP029MT", "RCP043MT", "RCP044MT"])
            },

            ChartKind::FluidTemperature3 => {
                if four_loops {
                    ChartSpec {
                        labels: labels(&[
                            ("RCP055MT", "RCP104MT"),
                            ("RCP056MT", "RCP200MT"),
                            ("RCP400MT", "RCP204MT"),
                        ]),
                        ..base(
                            FLUID_TITLE,
                            TEMPERATURE,
                            vec!["RCP055MT", "RCP056MT", "RCP400MT", "RCP404MT"],
                        )
                    }
                } else {
                    base(FLUID_TITLE, TEMPERATURE, vec!["RCP055MT", "RCP056MT"])
                }
            }

            ChartKind::MetalGradient1 => base(
                "Gradient des températures métal pendant l'EHP - Fond de cuve",
                TEMPERATURE_GRADIENT,
                vec!["EHP001MT_EHP002MTGrad", "EHP011MT_EHP003MTGrad"],
            ),

            ChartKind::MetalGradient2 => ChartSpec {
                labels: labels(&[
                    ("EHP004MT_EHP012MTGrad", "Max EHP004MTGrad/EHP012MTGrad - Bride de cuve"),
                    ("EHP013MT_EHP005MTGrad", "Max EHP005MTGrad/EHP013MTGrad - Bride de couvercle"),
                    ("EHP006MT_EHP014MTGrad", "Max EHP006MTGrad/EHP014MTGrad - JEP Pressu"),
                ]),
                ..base(
                    "Gradient des températures métal pendant l'EHP - Couvercle et Pressu",
                    TEMPERATURE_GRADIENT,
                    vec![
                        "EHP004MT_EHP012MTGrad",
                        "EHP013MT_EHP005MTGrad",
                        "EHP006MT_EHP014MTGrad",
                    ],
                )
            },

            ChartKind::MetalGradient3 => {
                let mut columns = vec![
                    "EHP007MT_EHP015MTGrad",
                    "EHP008MT_EHP016MTGrad",
                    "EHP017MT_EHP009MTGrad",
                ];
                let mut pairs = vec![
                    ("EHP007MT_EHP015MTGrad", "Max EHP007MTGrad/EHP015MTGrad - GV1"),
                    ("EHP008MT_EHP016MTGrad", "Max EHP008MTGrad/EHP016MTGrad - GV2"),
                    ("EHP017MT_EHP009MTGrad", "Max EHP009MTGrad/EHP017MTGrad - GV3"),
                ];
                if four_loops {
                    columns.push("EHP018MT_EHP010MTGrad");
                    pairs.push(("EHP018MT_EHP010MTGrad", "Max EHP010MTGrad/EHP018MTGrad - GV4"));
                }
                ChartSpec {
                    labels: labels(&pairs),
                    ..base(
                        "Gradient des températures métal pendant l'EHP - GV",
                        TEMPERATURE_GRADIENT,
                        columns,
                    )
                }
            }

            ChartKind::ProofPressure => proof_pressure(
                base(
                    "Evolution de la pression primaire pendant l'épreuve",
                    PRESSURE,
                    vec!["EHP001MP", "EHP002MP"],
                ),
                172.0,
                (207.8, "207,8 bar"),
                (206.9, "206,9 bar"),
            ),

            ChartKind::ProofPressurePlateau => proof_pressure(
                base(
                    "Evolution de la pression primaire pendant le palier d'épreuve",
                    PRESSURE,
                    vec!["EHP001MP", "EHP002MP"],
                ),
                205.0,
                (206.9, "206,9 bar"),
                (206.0, "206 bar"),
            ),
        }
    }
}

fn proof_pressure(
    base: ChartSpec,
    sill: f64,
    (max, max_label): (f64, &str),
    (min, min_label): (f64, &str),
) -> ChartSpec {
    ChartSpec {
        rows: RowSelection::MergeAbove { sill },
        derived: vec![
            DerivedTrace::Constant { key: "pression_max", value: max },
            DerivedTrace::Constant { key: "pression_min", value: min },
        ],
        labels: labels(&[("pression_max", max_label), ("pression_min", min_label)]),
        ..base
    }
}
