// src/noyau/eval.rs
//
// Évaluation
// ----------
// 1) pré-passe : déclarations des paramètres (`x+?`, `π6?`, `(…)3?`)
// 2) littéraux -> valeurs exactes
// 3) réduction : le premier nœud (ordre postfixe) dont les enfants sont tous des
//    valeurs est remplacé par sa valeur ; l’arbre entier est alors rendu et
//    ajouté à la démarche s’il diffère de l’entrée précédente. Une chaîne
//    `a op b op c` se réduit paire par paire depuis la gauche.
//
// Les erreurs portent sur le texte du flux évalué (plage du nœud fautif).

use log::{debug, trace};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::arbre::{Litteral, Maillon, Noeud, OpBinaire, OpUnaire, Parametre};
use super::config::Tables;
use super::erreurs::{Erreur, FormeIrrationnel, GenreErreur, Plage};
use super::fonctions::{self, Refus};
use super::format::{format_valeur, rendre};
use super::jetons::FluxJetons;
use super::lecture::{Conversions, Declaration};
use super::lexique::scanner;
use super::terme::{Symbole, Valeur};

/// Résultat d’une évaluation réussie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub valeur: Valeur,
    /// Valeur finale re-balayée en jetons.
    pub flux_final: FluxJetons,
    /// Démarche : une entrée par réduction visible, la dernière est le résultat.
    pub etapes: Vec<String>,
    pub conversions: Conversions,
}

struct Contexte<'a> {
    flux: &'a FluxJetons,
    conv: &'a Conversions,
}

impl Contexte<'_> {
    fn erreur(&self, genre: GenreErreur, plage: Plage) -> Erreur {
        Erreur::new(genre, &self.flux.texte, vec![plage])
    }

    fn refus(&self, r: Refus, fonction: &str, plage: Plage) -> Erreur {
        let genre = match r {
            Refus::Domaine(raison) => GenreErreur::Domaine {
                fonction: fonction.to_string(),
                raison,
            },
            Refus::DivisionParZero => GenreErreur::DivisionParZero {
                unite: self.flux.extrait(plage),
            },
            Refus::Conversion(symbole) => GenreErreur::Conversion { symbole },
        };
        self.erreur(genre, plage)
    }
}

/* ------------------------ Pré-passe : paramètres ------------------------ */

fn parametre_invalide(flux: &FluxJetons, p: &Parametre) -> Erreur {
    Erreur::new(
        GenreErreur::Irrationnel {
            forme: FormeIrrationnel::Parametre,
            contenu: p.texte.clone(),
        },
        &flux.texte,
        vec![p.plage],
    )
}

/// Fusionne deux déclarations d’un même irrationnel ; None si elles se contredisent.
fn fusionner(a: &Declaration, b: &Declaration) -> Option<Declaration> {
    let signe = match (a.signe, b.signe) {
        (Some(x), Some(y)) if x != y => return None,
        (x, y) => x.or(y),
    };
    let valeur = match (&a.valeur, &b.valeur) {
        (Some(x), Some(y)) if x != y => return None,
        (x, y) => x.clone().or_else(|| y.clone()),
    };
    // `x+?` puis `x-2?`
    if let (Some(s), Some(v)) = (signe, &valeur) {
        let sv = signe_du_rationnel(v);
        if sv != 0 && sv != s {
            return None;
        }
    }
    Some(Declaration { signe, valeur })
}

fn signe_du_rationnel(r: &BigRational) -> i8 {
    if r.is_zero() {
        0
    } else if r.is_negative() {
        -1
    } else {
        1
    }
}

fn collecter(n: &Noeud, flux: &FluxJetons, conv: &mut Conversions) -> Result<(), Erreur> {
    match n {
        Noeud::Litteral {
            litteral:
                Litteral::Irrationnel {
                    symbole,
                    parametre: Some(p),
                },
            ..
        } => {
            if symbole.est_natif() {
                let places = p.decimales().ok_or_else(|| parametre_invalide(flux, p))?;
                let retenu = conv.natifs.entry(symbole.clone()).or_insert(places);
                *retenu = (*retenu).max(places);
                return Ok(());
            }
            let nouvelle = Declaration {
                signe: p.signe,
                valeur: p.valeur_signee(),
            };
            let fusion = match conv.personnalises.get(symbole) {
                Some(ancienne) => fusionner(ancienne, &nouvelle),
                None => Some(nouvelle),
            };
            let fusion = fusion.ok_or_else(|| parametre_invalide(flux, p))?;
            conv.personnalises.insert(symbole.clone(), fusion);
            Ok(())
        }
        Noeud::Litteral { .. } | Noeud::Valeur { .. } => Ok(()),
        Noeud::Unaire { operande, .. } => collecter(operande, flux, conv),
        Noeud::Binaire { gauche, droite, .. } => {
            collecter(gauche, flux, conv)?;
            collecter(droite, flux, conv)
        }
        Noeud::Chaine { tete, suite, .. } => {
            collecter(tete, flux, conv)?;
            suite.iter().try_for_each(|m| collecter(&m.noeud, flux, conv))
        }
        Noeud::Groupe {
            contenu, parametre, ..
        } => {
            if let Some(p) = parametre {
                let places = p.decimales().ok_or_else(|| parametre_invalide(flux, p))?;
                conv.decimales = Some(conv.decimales.map_or(places, |d| d.max(places)));
            }
            collecter(contenu, flux, conv)
        }
        Noeud::Appel { args, .. } => args.iter().try_for_each(|a| collecter(a, flux, conv)),
    }
}

/* ------------------------ Littéraux -> valeurs ------------------------ */

fn valeurs_litterales(n: Noeud) -> Noeud {
    match n {
        Noeud::Litteral { litteral, plage } => {
            let valeur = match litteral {
                Litteral::Fraction(r) => Valeur::rationnel(r),
                Litteral::Irrationnel { symbole, .. } => Valeur::symbole(symbole),
            };
            Noeud::Valeur { valeur, plage }
        }
        Noeud::Unaire { op, operande, plage } => Noeud::Unaire {
            op,
            operande: Box::new(valeurs_litterales(*operande)),
            plage,
        },
        Noeud::Binaire {
            op,
            forme,
            gauche,
            droite,
            plage,
        } => Noeud::Binaire {
            op,
            forme,
            gauche: Box::new(valeurs_litterales(*gauche)),
            droite: Box::new(valeurs_litterales(*droite)),
            plage,
        },
        Noeud::Chaine { tete, suite, plage } => Noeud::Chaine {
            tete: Box::new(valeurs_litterales(*tete)),
            suite: suite
                .into_iter()
                .map(|m| Maillon {
                    noeud: valeurs_litterales(m.noeud),
                    ..m
                })
                .collect(),
            plage,
        },
        Noeud::Groupe {
            contenu,
            parametre,
            plage,
        } => Noeud::Groupe {
            contenu: Box::new(valeurs_litterales(*contenu)),
            parametre,
            plage,
        },
        Noeud::Appel {
            fonction,
            args,
            plage,
        } => Noeud::Appel {
            fonction,
            args: args.into_iter().map(valeurs_litterales).collect(),
            plage,
        },
        v @ Noeud::Valeur { .. } => v,
    }
}

/* ------------------------ Règles ------------------------ */

fn en_valeur(n: Noeud) -> Valeur {
    match n {
        Noeud::Valeur { valeur, .. } => valeur,
        _ => Valeur::zero(),
    }
}

fn unaire(ctx: &Contexte, op: OpUnaire, v: &Valeur, plage: Plage) -> Result<Valeur, Erreur> {
    let (nom, r) = match op {
        OpUnaire::Racine => ("sqrt", fonctions::racine(v, ctx.conv)),
        OpUnaire::Factorielle => ("fact", fonctions::factorielle(v, ctx.conv)),
        OpUnaire::Absolu => ("abs", fonctions::absolu(v, ctx.conv)),
        OpUnaire::Degre => {
            let un_degre = BigRational::new(BigInt::from(1), BigInt::from(180));
            ("°", Ok(v * &Valeur::symbole(Symbole::Pi).echelle(&un_degre)))
        }
    };
    r.map_err(|e| ctx.refus(e, nom, plage))
}

fn binaire(
    ctx: &Contexte,
    op: OpBinaire,
    g: &Valeur,
    d: &Valeur,
    plage: Plage,
) -> Result<Valeur, Erreur> {
    let (nom, r) = match op {
        OpBinaire::Plus => return Ok(g + d),
        OpBinaire::Moins => return Ok(g - d),
        OpBinaire::Fois => return Ok(g * d),
        OpBinaire::Divise => ("/", g.quotient(d).ok_or(Refus::DivisionParZero)),
        OpBinaire::Puissance => ("pow", fonctions::puissance(g, d, ctx.conv)),
        OpBinaire::Modulo => ("mod", fonctions::modulo(g, d, ctx.conv)),
    };
    r.map_err(|e| ctx.refus(e, nom, plage))
}

/* ------------------------ Réduction ------------------------ */

/// Réduit le premier nœud (ordre postfixe) dont tous les enfants sont des valeurs.
fn reduire(n: Noeud, ctx: &Contexte) -> Result<Noeud, Erreur> {
    match n {
        Noeud::Unaire { op, operande, plage } => {
            if !operande.est_valeur() {
                return Ok(Noeud::Unaire {
                    op,
                    operande: Box::new(reduire(*operande, ctx)?),
                    plage,
                });
            }
            let valeur = unaire(ctx, op, &en_valeur(*operande), plage)?;
            Ok(Noeud::Valeur { valeur, plage })
        }
        Noeud::Binaire {
            op,
            forme,
            gauche,
            droite,
            plage,
        } => {
            if !gauche.est_valeur() {
                return Ok(Noeud::Binaire {
                    op,
                    forme,
                    gauche: Box::new(reduire(*gauche, ctx)?),
                    droite,
                    plage,
                });
            }
            if !droite.est_valeur() {
                return Ok(Noeud::Binaire {
                    op,
                    forme,
                    gauche,
                    droite: Box::new(reduire(*droite, ctx)?),
                    plage,
                });
            }
            let valeur = binaire(ctx, op, &en_valeur(*gauche), &en_valeur(*droite), plage)?;
            Ok(Noeud::Valeur { valeur, plage })
        }
        Noeud::Chaine {
            tete,
            mut suite,
            plage,
        } => {
            if !tete.est_valeur() {
                return Ok(Noeud::Chaine {
                    tete: Box::new(reduire(*tete, ctx)?),
                    suite,
                    plage,
                });
            }
            let Some(Maillon { op, forme, noeud }) = suite.pop_front() else {
                return Ok(*tete);
            };
            if !noeud.est_valeur() {
                suite.push_front(Maillon {
                    op,
                    forme,
                    noeud: reduire(noeud, ctx)?,
                });
                return Ok(Noeud::Chaine { tete, suite, plage });
            }
            // paire de tête : même plage qu’un nœud binaire `tete op noeud`
            let paire = tete.plage().union(noeud.plage());
            let valeur = binaire(ctx, op, &en_valeur(*tete), &en_valeur(noeud), paire)?;
            let tete = Noeud::Valeur {
                valeur,
                plage: paire,
            };
            if suite.is_empty() {
                return Ok(tete);
            }
            Ok(Noeud::Chaine {
                tete: Box::new(tete),
                suite,
                plage,
            })
        }
        Noeud::Groupe {
            contenu,
            parametre,
            plage,
        } => {
            if contenu.est_valeur() {
                return Ok(Noeud::Valeur {
                    valeur: en_valeur(*contenu),
                    plage,
                });
            }
            Ok(Noeud::Groupe {
                contenu: Box::new(reduire(*contenu, ctx)?),
                parametre,
                plage,
            })
        }
        Noeud::Appel {
            fonction,
            mut args,
            plage,
        } => {
            if let Some(i) = args.iter().position(|a| !a.est_valeur()) {
                let a = std::mem::replace(&mut args[i], Noeud::zero(plage));
                args[i] = reduire(a, ctx)?;
                return Ok(Noeud::Appel {
                    fonction,
                    args,
                    plage,
                });
            }
            let valeurs: Vec<Valeur> = args.into_iter().map(en_valeur).collect();
            let valeur = fonctions::appliquer(fonction, &valeurs, ctx.conv)
                .map_err(|e| ctx.refus(e, fonction.nom(), plage))?;
            Ok(Noeud::Valeur { valeur, plage })
        }
        n @ (Noeud::Litteral { .. } | Noeud::Valeur { .. }) => Ok(valeurs_litterales(n)),
    }
}

/* ------------------------ API ------------------------ */

/// Évalue un arbre issu de `flux` ; `tables` sert à re-balayer la valeur finale.
pub fn evaluer(racine: Noeud, flux: &FluxJetons, tables: &Tables) -> Result<Evaluation, Erreur> {
    let mut conversions = Conversions::default();
    collecter(&racine, flux, &mut conversions)?;
    debug!("déclarations : {conversions:?}");

    let ctx = Contexte {
        flux,
        conv: &conversions,
    };

    let mut arbre = valeurs_litterales(racine);
    let mut etapes: Vec<String> = Vec::new();
    while !arbre.est_valeur() {
        arbre = reduire(arbre, &ctx)?;
        let rendu = rendre(&arbre);
        if etapes.last() != Some(&rendu) {
            trace!("étape : {rendu}");
            etapes.push(rendu);
        }
    }

    let valeur = en_valeur(arbre);
    let texte = format_valeur(&valeur);
    if etapes.is_empty() {
        etapes.push(texte.clone());
    }
    let flux_final = scanner(&texte, tables)?;
    debug!("évaluation : {} -> {texte} ({} étape(s))", flux.texte, etapes.len());

    Ok(Evaluation {
        valeur,
        flux_final,
        etapes,
        conversions,
    })
}
